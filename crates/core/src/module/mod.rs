//! Input records handed over by the host for a single build

mod descriptor;
mod recipe;

pub use descriptor::ModuleDescriptor;
pub use recipe::RecipeContext;

pub fn info_command() {
    println!("{}", vib_cargo_core::describe_plugin().to_json());
}

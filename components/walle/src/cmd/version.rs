/// Prints the application version.
pub fn run() {
    println!("Walle {}", env!("CARGO_PKG_VERSION"));
}

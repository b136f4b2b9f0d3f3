fn main() -> std::io::Result<()> {
    testgen_lib::run()
}

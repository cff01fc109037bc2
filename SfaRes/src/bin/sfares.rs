fn main() -> anyhow::Result<()> {
    sfares::cli::run_cli()
}

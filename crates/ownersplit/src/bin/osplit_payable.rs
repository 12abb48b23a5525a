//! osplit-payable - Print what a car's owner is owed for one month.

fn main() -> std::process::ExitCode {
    ownersplit::cmd::payable_cmd::main()
}

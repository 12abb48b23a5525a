//! osplit-report - Schedules, category totals and data-quality reports.

fn main() -> std::process::ExitCode {
    ownersplit::cmd::report_cmd::main()
}

use contactclient_core::report::{Level, ReportLine};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print report lines to stdout in order. Errors get an `error: ` prefix so
/// they stand out without changing the exit status.
pub fn print_report(lines: &[ReportLine]) {
    for line in lines {
        match line.level {
            Level::Info => println!("{}", line.text),
            Level::Error => println!("error: {}", line.text),
        }
    }
}

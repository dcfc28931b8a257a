use anyhow::Result;
use nimbyvote::find_sheets;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SheetsArgs) -> Result<()> {
    for name in find_sheets(&args.workbook, &args.pattern, args.exclude.as_deref())? {
        println!("{name}");
    }
    Ok(())
}

use colored::*;
use drover_common::scan::ScanMode;

use crate::terminal::print;

pub fn modes() {
    print::header("scan modes", 0);

    let details: Vec<(String, ColoredString)> = ScanMode::ALL
        .iter()
        .map(|mode| {
            let flags = format!("{:<8}", mode.engine_args().join(" "));
            let value = format!("{} {}", flags.cyan(), mode.describe()).normal();
            (mode.to_string(), value)
        })
        .collect();

    print::as_tree_one_level(details);
}

use super::ui;
use crate::core::quick::QUICK_GROUPS;
use anyhow::Result;
use comfy_table::Cell;

pub fn render() -> String {
    let mut sections = Vec::new();
    for group in QUICK_GROUPS {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Conversion"), ui::header_cell("Result")]);
        for conversion in group.conversions {
            let result = match conversion.result() {
                Ok(value) => ui::number_cell(value.to_string()),
                Err(_) => ui::error_cell(),
            };
            table.add_row(vec![Cell::new(conversion.label), result]);
        }
        sections.push(format!(
            "{}\n{}",
            ui::style_text(group.title, ui::StyleType::Title),
            table
        ));
    }
    sections.join("\n\n")
}

pub fn run() -> Result<()> {
    println!("{}", render());
    Ok(())
}

use super::ui;
use crate::core::convert::parse_input;
use crate::core::currency::{RateProvider, RateSnapshot, currency_info};
use crate::core::error::ConversionError;
use crate::providers::caching::{RateResolver, UsageInfo};
use anyhow::Result;
use comfy_table::Cell;

pub const DEFAULT_FROM: &str = "USD";
pub const DEFAULT_TO: &str = "EUR";

#[derive(Debug, Clone, Default)]
pub struct CurrencyArgs {
    pub amount: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub refresh: bool,
    pub swap: bool,
}

impl CurrencyArgs {
    /// Source and target codes after defaults and swapping.
    pub fn pair(&self) -> (String, String) {
        let from = self.from.as_deref().unwrap_or(DEFAULT_FROM).to_uppercase();
        let to = self.to.as_deref().unwrap_or(DEFAULT_TO).to_uppercase();
        if self.swap { (to, from) } else { (from, to) }
    }
}

/// Names the degraded source, empty for live or fresh rates.
pub fn source_banner(snapshot: &RateSnapshot) -> Option<String> {
    if !snapshot.source.is_degraded() && snapshot.warning.is_none() {
        return None;
    }
    let message = match &snapshot.warning {
        Some(warning) => format!("Using {} exchange rates ({warning})", snapshot.source),
        None => format!("Using {} exchange rates", snapshot.source),
    };
    Some(ui::warning_banner(&message))
}

fn footer(snapshot: &RateSnapshot) -> String {
    ui::style_text(
        &format!(
            "Rates: {} · updated {}",
            snapshot.source,
            snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        ui::StyleType::Subtle,
    )
}

pub fn render_conversion(
    snapshot: &RateSnapshot,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<String, ConversionError> {
    let converted = snapshot.convert(amount, from, to)?;
    let rate = snapshot.exchange_rate(from, to)?;
    let symbol = currency_info(to).map_or("", |c| c.symbol);

    let mut lines = Vec::new();
    if let Some(banner) = source_banner(snapshot) {
        lines.push(banner);
    }
    lines.push(format!(
        "{amount:.2} {from} = {} {to}",
        ui::style_text(&format!("{symbol}{converted:.2}"), ui::StyleType::Result)
    ));
    lines.push(format!("1 {from} = {rate:.4} {to}"));
    lines.push(footer(snapshot));
    Ok(lines.join("\n"))
}

pub fn render_rates(snapshot: &RateSnapshot) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (1 {})", snapshot.base)),
    ]);
    for (code, rate) in &snapshot.rates {
        let name = currency_info(code).map_or("", |c| c.name);
        table.add_row(vec![
            Cell::new(code),
            Cell::new(name),
            ui::number_cell(format!("{rate:.4}")),
        ]);
    }

    let mut output = String::new();
    if let Some(banner) = source_banner(snapshot) {
        output.push_str(&banner);
        output.push('\n');
    }
    output.push_str(&table.to_string());
    output.push('\n');
    output.push_str(&footer(snapshot));
    output
}

pub fn render_status(info: &UsageInfo) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Item"), ui::header_cell("Value")]);
    let last_request = info
        .last_request
        .map_or("never".to_string(), |t| t.to_rfc3339());
    table.add_row(vec!["Last request", last_request.as_str()]);
    table.add_row(vec![
        "Memory cache entries",
        info.memory_entries.to_string().as_str(),
    ]);
    table.add_row(vec![
        "Persisted rates",
        if info.has_persisted { "yes" } else { "no" },
    ]);
    table.add_row(vec!["API key", info.api_key.as_str()]);
    table.to_string()
}

async fn resolve_with_spinner<P: RateProvider>(
    resolver: &RateResolver<P>,
    refresh: bool,
) -> RateSnapshot {
    let pb = ui::new_spinner("Resolving exchange rates...");
    let snapshot = resolver.resolve(refresh).await;
    pb.finish_and_clear();
    snapshot
}

pub async fn run<P: RateProvider>(resolver: &RateResolver<P>, args: &CurrencyArgs) -> Result<()> {
    let Some(amount) = parse_input(&args.amount, false)? else {
        println!("{}", ui::style_text("Nothing to convert", ui::StyleType::Subtle));
        return Ok(());
    };
    let (from, to) = args.pair();

    let snapshot = resolve_with_spinner(resolver, args.refresh).await;
    println!("{}", render_conversion(&snapshot, amount, &from, &to)?);
    Ok(())
}

pub async fn run_rates<P: RateProvider>(
    resolver: &RateResolver<P>,
    refresh: bool,
    offline: bool,
) -> Result<()> {
    let snapshot = if offline {
        resolver.cached().await?
    } else {
        resolve_with_spinner(resolver, refresh).await
    };
    println!("{}", render_rates(&snapshot));
    Ok(())
}

pub async fn run_status<P: RateProvider>(resolver: &RateResolver<P>) -> Result<()> {
    println!("{}", render_status(&resolver.usage_info().await));
    Ok(())
}

pub async fn run_clear_cache<P: RateProvider>(resolver: &RateResolver<P>) -> Result<()> {
    resolver.clear_cache().await;
    println!("Exchange rate cache cleared");
    Ok(())
}

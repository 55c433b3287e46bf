use super::ui;
use crate::core::convert::{ConversionRequest, format_result, parse_input};
use crate::core::error::ConversionError;
use crate::core::units::{self, UnitCategory};
use anyhow::{Result, anyhow};

/// Unit conversion as typed on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConvertArgs {
    pub value: String,
    pub from: Option<String>,
    pub to: Option<String>,
    pub category: Option<String>,
    pub swap: bool,
}

fn resolve_category(args: &ConvertArgs) -> Result<&'static UnitCategory> {
    if let Some(key) = &args.category {
        return units::find_category(key)
            .ok_or_else(|| ConversionError::UnknownCategory(key.clone()).into());
    }
    let guessed = args
        .from
        .as_deref()
        .or(args.to.as_deref())
        .and_then(units::category_of);
    guessed
        .or_else(|| units::find_category("length"))
        .ok_or_else(|| anyhow!("No unit categories available"))
}

/// Maps abbreviations onto unit keys; unknown names pass through so the
/// dispatcher reports them.
fn resolve_unit(category: &UnitCategory, unit: &str) -> String {
    category
        .find_unit(unit)
        .map_or_else(|| unit.to_string(), |u| u.value.to_string())
}

fn describe(category: &UnitCategory, unit: &str) -> String {
    category
        .find_unit(unit)
        .map_or_else(|| unit.to_string(), |u| u.label.to_string())
}

/// Builds the request the arguments describe, `None` for empty input.
pub fn build_request(args: &ConvertArgs) -> Result<Option<ConversionRequest>> {
    let Some(value) = parse_input(&args.value, true)? else {
        return Ok(None);
    };

    let category = resolve_category(args)?;
    let (default_from, default_to) = category.default_pair();
    let from = args
        .from
        .as_deref()
        .map_or_else(|| default_from.value.to_string(), |u| resolve_unit(category, u));
    let to = args
        .to
        .as_deref()
        .map_or_else(|| default_to.value.to_string(), |u| resolve_unit(category, u));

    let request = ConversionRequest {
        value,
        from,
        to,
        category: category.key.to_string(),
    };
    Ok(Some(if args.swap { request.swapped() } else { request }))
}

pub fn render(args: &ConvertArgs) -> Result<String> {
    let Some(request) = build_request(args)? else {
        return Ok(ui::style_text("Nothing to convert", ui::StyleType::Subtle));
    };
    let category = units::find_category(&request.category)
        .ok_or_else(|| ConversionError::UnknownCategory(request.category.clone()))?;

    let result = request.run()?;
    Ok(format!(
        "{} {} = {} {}",
        format_result(request.value),
        describe(category, &request.from),
        ui::style_text(&format_result(result), ui::StyleType::Result),
        describe(category, &request.to),
    ))
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    println!("{}", render(args)?);
    Ok(())
}

/// Lists every category with its units.
pub fn render_categories() -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Key"),
        ui::header_cell("Units"),
    ]);

    for category in units::categories() {
        let unit_list = category
            .units
            .iter()
            .map(|u| format!("{} ({})", u.value, u.abbr))
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![category.name, category.key, unit_list.as_str()]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: &str, from: Option<&str>, to: Option<&str>) -> ConvertArgs {
        ConvertArgs {
            value: value.to_string(),
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_request_guesses_category_and_abbreviations() {
        let request = build_request(&args("5", Some("kg"), Some("lbs")))
            .unwrap()
            .unwrap();
        assert_eq!(request.category, "mass");
        assert_eq!(request.from, "kilograms");
        assert_eq!(request.to, "pounds");
    }

    #[test]
    fn test_build_request_defaults_and_swap() {
        let mut a = args("1", None, None);
        let request = build_request(&a).unwrap().unwrap();
        assert_eq!((request.from.as_str(), request.to.as_str()), ("meters", "feet"));

        a.category = Some("temperature".to_string());
        a.swap = true;
        let request = build_request(&a).unwrap().unwrap();
        assert_eq!(
            (request.from.as_str(), request.to.as_str()),
            ("fahrenheit", "celsius")
        );
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        assert!(build_request(&args("", None, None)).unwrap().is_none());
        assert!(render(&args("  ", None, None)).is_ok());
    }

    #[test]
    fn test_render_conversion() {
        let output = render(&args("1", Some("km"), Some("m"))).unwrap();
        assert!(output.contains("Kilometers (km)"));
        assert!(output.contains("1000"));
        assert!(output.contains("Meters (m)"));
    }

    #[test]
    fn test_render_rejects_mixed_units() {
        let mut a = args("1", Some("meters"), Some("grams"));
        a.category = Some("length".to_string());
        let err = render(&a).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Conversion not possible between meters and grams"
        );
    }

    #[test]
    fn test_unknown_category_is_reported() {
        let mut a = args("1", None, None);
        a.category = Some("vibes".to_string());
        assert!(render(&a).unwrap_err().to_string().contains("vibes"));
    }

    #[test]
    fn test_categories_table_lists_all() {
        let table = render_categories();
        for category in units::categories() {
            assert!(table.contains(category.key));
        }
    }
}

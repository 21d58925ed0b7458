use crate::Location;

pub const CANADA: &str = "Canada";

/// Province and territory codes recognised as Canadian.
pub const CANADIAN_PROVINCES: &[&str] = &[
    "ON", "BC", "QC", "AB", "SK", "MB", "NS", "NB", "PE", "YT", "NL",
];

/// Split `City, PROV[, ...]` into its parts and infer the country.
///
/// Text without a comma has no city or province. The country is only ever
/// inferred as Canada: either the whole text is `Canada` or the province is a
/// known Canadian code. Everything else leaves `country` empty.
pub fn parse_location(text: &str) -> Location {
    let (city, province) = if text.contains(',') {
        let mut segments = text.split(',').map(str::trim);
        let city = segments.next().map(str::to_string);
        let province = segments.next().map(str::to_string);
        (city, province)
    } else {
        (None, None)
    };

    let is_canadian_province = province
        .as_deref()
        .is_some_and(|code| CANADIAN_PROVINCES.contains(&code));
    let country = (text == CANADA || is_canadian_province).then(|| CANADA.to_string());

    Location {
        city,
        province,
        country,
    }
}

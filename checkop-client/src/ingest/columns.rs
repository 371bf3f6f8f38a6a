//! Header-alias column resolution
//!
//! Uploaded and exported sheets name their columns inconsistently
//! ("Número", "telefone", "operadora atual", ...). Each canonical field
//! carries an ordered list of acceptable aliases; resolution lower-cases
//! and trims the header row, then takes the first alias that appears as a
//! substring of any header. Alias order matters: more specific fields are
//! listed (and resolved) with their own aliases so e.g. "ddd" does not
//! swallow the subscriber-number column.
//!
//! Matching is substring-based on purpose, to tolerate decorated headers
//! like "Número do cliente". The flip side: an ambiguous header can
//! mis-map a column. Known limitation, kept pending a product decision on
//! stricter matching.

/// Aliases for the subscriber-number column.
pub const NUMBER_ALIASES: &[&str] = &["numero", "número", "telefone", "phone", "number"];

const DDD_ALIASES: &[&str] = &["ddd"];
const ANATEL_ALIASES: &[&str] = &["válido", "valido", "anatel", "status_anatel", "status anatel"];
const TYPE_ALIASES: &[&str] = &["tipo", "type"];
const ORIGIN_CARRIER_ALIASES: &[&str] = &[
    "operadora_original",
    "operadora original",
    "op_original",
    "operadora de origem",
];
const CURRENT_CARRIER_ALIASES: &[&str] =
    &["operadora_atual", "operadora atual", "op_atual", "operadora"];
const PORTED_ALIASES: &[&str] = &["portado", "portabilidade"];
const PORT_DATE_ALIASES: &[&str] = &[
    "portado",
    "data_portabilidade",
    "data portabilidade",
    "data",
    "date",
];
const MUNICIPALITY_ALIASES: &[&str] = &[
    "municipio",
    "município",
    "cidade",
    "city",
    "municipio_registro",
];
const MUNICIPALITY_REGION_ALIASES: &[&str] = &[
    "municipio_regiao",
    "município região",
    "regiao",
    "região",
];
const UF_ALIASES: &[&str] = &["uf", "estado", "state"];

/// Per-ingestion mapping from canonical field to source column index.
/// `None` means no header matched; the field defaults for every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub ddd: Option<usize>,
    pub number: Option<usize>,
    pub anatel: Option<usize>,
    pub line_type: Option<usize>,
    pub origin_carrier: Option<usize>,
    pub current_carrier: Option<usize>,
    pub ported: Option<usize>,
    pub port_date: Option<usize>,
    pub municipality: Option<usize>,
    pub municipality_region: Option<usize>,
    pub uf: Option<usize>,
}

impl ColumnMap {
    /// Resolve every canonical field against a raw header row.
    pub fn resolve(raw_headers: &[String]) -> Self {
        let headers: Vec<String> = raw_headers
            .iter()
            .map(|h| h.to_lowercase().trim().to_string())
            .collect();

        ColumnMap {
            ddd: find_column(&headers, DDD_ALIASES),
            number: find_column(&headers, NUMBER_ALIASES),
            anatel: find_column(&headers, ANATEL_ALIASES),
            line_type: find_column(&headers, TYPE_ALIASES),
            origin_carrier: find_column(&headers, ORIGIN_CARRIER_ALIASES),
            current_carrier: find_column(&headers, CURRENT_CARRIER_ALIASES),
            ported: find_column(&headers, PORTED_ALIASES),
            port_date: find_column(&headers, PORT_DATE_ALIASES),
            municipality: find_column(&headers, MUNICIPALITY_ALIASES),
            municipality_region: find_column(&headers, MUNICIPALITY_REGION_ALIASES),
            uf: find_column(&headers, UF_ALIASES),
        }
    }
}

/// First alias that substring-matches any header wins.
pub fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        if let Some(index) = headers.iter().position(|h| h.contains(alias)) {
            return Some(index);
        }
    }
    None
}

/// Cell lookup through a resolved index: unresolved column or missing/empty
/// cell both yield `None`.
pub fn cell_value(row: &[String], index: Option<usize>) -> Option<String> {
    let cell = row.get(index?)?.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn number_resolves_past_ddd_column() {
        // "DDD" must not falsely capture the subscriber-number field
        let map = ColumnMap::resolve(&headers(&["DDD", "Telefone", "Anatel"]));
        assert_eq!(map.ddd, Some(0));
        assert_eq!(map.number, Some(1));
        assert_eq!(map.anatel, Some(2));
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        let map = ColumnMap::resolve(&headers(&["Número do Cliente", "OPERADORA ATUAL"]));
        assert_eq!(map.number, Some(0));
        assert_eq!(map.current_carrier, Some(1));
    }

    #[test]
    fn generic_carrier_alias_can_shadow_the_specific_column() {
        // Documented fragility: the generic "operadora" alias substring-
        // matches "Operadora Original" before reaching the dedicated
        // current-carrier column. Pinned so a matching-strategy change is
        // a conscious decision.
        let map = ColumnMap::resolve(&headers(&["Operadora Original", "Operadora"]));
        assert_eq!(map.origin_carrier, Some(0));
        assert_eq!(map.current_carrier, Some(0));
    }

    #[test]
    fn exact_current_carrier_header_resolves_cleanly() {
        let map = ColumnMap::resolve(&headers(&["Operadora Original", "Operadora Atual"]));
        assert_eq!(map.origin_carrier, Some(0));
        assert_eq!(map.current_carrier, Some(1));
    }

    #[test]
    fn unmatched_fields_are_none() {
        let map = ColumnMap::resolve(&headers(&["numero"]));
        assert_eq!(map.number, Some(0));
        assert_eq!(map.uf, None);
        assert_eq!(map.port_date, None);
        assert_eq!(map.municipality, None);
    }

    #[test]
    fn headers_are_trimmed_before_matching() {
        let map = ColumnMap::resolve(&headers(&["  Numero  ", " UF "]));
        assert_eq!(map.number, Some(0));
        assert_eq!(map.uf, Some(1));
    }

    #[test]
    fn cell_value_handles_missing_and_empty() {
        let row = headers(&["11", "  ", "Vivo"]);
        assert_eq!(cell_value(&row, Some(0)).as_deref(), Some("11"));
        assert_eq!(cell_value(&row, Some(1)), None);
        assert_eq!(cell_value(&row, Some(2)).as_deref(), Some("Vivo"));
        assert_eq!(cell_value(&row, Some(9)), None);
        assert_eq!(cell_value(&row, None), None);
    }
}

//! Lookup tables: code-to-label mappings with a common tier and part-type
//! overrides

use partcode_schema::Side;
use partcode_schema::normalize::normalize_part_type;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Part-type marker of the common tier
pub const WILDCARD: &str = "*";

static IK_FAMILY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(V\d{2})\d$").expect("valid IK family regex"));

/// IK family group of a part-type (`V111` -> `V11`); other inputs are
/// returned normalized and upper-cased
pub fn ik_group_key(part_type: &str) -> String {
    let normalized = normalize_part_type(part_type).to_uppercase();
    match IK_FAMILY.captures(&normalized) {
        Some(caps) => caps[1].to_string(),
        None => normalized,
    }
}

/// Part-type keys to try, most specific first
fn candidate_keys(side: Side, part_type: &str) -> Vec<String> {
    let exact = normalize_part_type(part_type).to_uppercase();
    if side == Side::Ok {
        return vec![exact];
    }
    let group = ik_group_key(&exact);
    if group == exact {
        vec![exact]
    } else {
        vec![exact, group]
    }
}

/// One lookup table, e.g. `material_lookup`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    /// Table name, matching the union schema's `lookup` column
    pub name: String,
    /// Header of the label column in the source file
    pub label_column: String,
    common: BTreeMap<String, String>,
    overrides: BTreeMap<String, BTreeMap<String, String>>,
}

impl LookupTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label_column: "label".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = column.into();
        self
    }

    /// Add an entry. `part_type` `*` targets the common tier. Blank codes are
    /// ignored; a later entry for the same key replaces the earlier one.
    pub fn insert(&mut self, part_type: &str, code: &str, label: &str) {
        let code = code.trim();
        if code.is_empty() {
            return;
        }
        let part_type = normalize_part_type(part_type).to_uppercase();
        let label = label.trim().to_string();
        if part_type == WILDCARD {
            self.common.insert(code.to_string(), label);
        } else {
            self.overrides
                .entry(part_type)
                .or_default()
                .insert(code.to_string(), label);
        }
    }

    /// `{code: label}` for a part-type: the common tier merged with that
    /// part-type's overrides, override winning
    #[must_use]
    pub fn options(&self, part_type: &str) -> BTreeMap<String, String> {
        let mut merged = self.common.clone();
        let key = normalize_part_type(part_type).to_uppercase();
        if let Some(specific) = self.overrides.get(&key) {
            merged.extend(specific.iter().map(|(c, l)| (c.clone(), l.clone())));
        }
        merged
    }

    /// Label of `code`: exact part-type, then the IK family group, then the
    /// common tier
    #[must_use]
    pub fn label(&self, side: Side, part_type: &str, code: &str) -> Option<&str> {
        let code = code.trim();
        candidate_keys(side, part_type)
            .iter()
            .find_map(|key| self.overrides.get(key).and_then(|codes| codes.get(code)))
            .or_else(|| self.common.get(code))
            .map(String::as_str)
    }

    /// Label of `code`, or `UNKNOWN(code)`
    #[must_use]
    pub fn describe(&self, side: Side, part_type: &str, code: &str) -> String {
        self.label(side, part_type, code)
            .map_or_else(|| format!("UNKNOWN({})", code.trim()), str::to_string)
    }

    #[must_use]
    pub fn contains(&self, side: Side, part_type: &str, code: &str) -> bool {
        self.label(side, part_type, code).is_some()
    }

    /// Number of entries over both tiers
    #[must_use]
    pub fn len(&self) -> usize {
        self.common.len() + self.overrides.values().map(BTreeMap::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lookup tables by name
#[derive(Debug, Clone, Default)]
pub struct LookupRegistry {
    tables: BTreeMap<String, LookupTable>,
}

impl LookupRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: LookupTable) {
        self.tables.insert(table.name.clone(), table);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name.trim())
    }

    /// Label of `code` in table `name`; `UNKNOWN(code)` when the table or the
    /// code is unknown
    #[must_use]
    pub fn describe(&self, name: &str, side: Side, part_type: &str, code: &str) -> String {
        match self.get(name) {
            Some(table) => table.describe(side, part_type, code),
            None => format!("UNKNOWN({})", code.trim()),
        }
    }

    /// Registered table names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<LookupTable> for LookupRegistry {
    fn from_iter<I: IntoIterator<Item = LookupTable>>(iter: I) -> Self {
        let mut registry = Self::new();
        for table in iter {
            registry.register(table);
        }
        registry
    }
}

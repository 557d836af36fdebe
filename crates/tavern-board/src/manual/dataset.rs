//! Monster reference records and the two ways they arrive: a JSON array
//! (embedded or served next to the front-end) or a tab-separated export of
//! the monster spreadsheet.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("invalid monster JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spreadsheet has no '{0}' column")]
    MissingColumn(&'static str),
}

/// One creature.  Numeric columns are optional; text columns default to "".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterRecord {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Alignment code (`LG`, `CE`, `U`, ...).
    pub align: String,
    #[serde(deserialize_with = "lenient_number")]
    pub ac: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub hp: Option<f64>,
    pub speeds: String,
    #[serde(rename = "str", deserialize_with = "lenient_number")]
    pub strength: Option<f64>,
    #[serde(rename = "dex", deserialize_with = "lenient_number")]
    pub dexterity: Option<f64>,
    #[serde(rename = "con", deserialize_with = "lenient_number")]
    pub constitution: Option<f64>,
    #[serde(rename = "int", deserialize_with = "lenient_number")]
    pub intelligence: Option<f64>,
    #[serde(rename = "wis", deserialize_with = "lenient_number")]
    pub wisdom: Option<f64>,
    #[serde(rename = "cha", deserialize_with = "lenient_number")]
    pub charisma: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub cr: Option<f64>,
    pub sav_throws: String,
    pub skills: String,
    pub senses: String,
    pub languages: String,
    pub additional: String,
}

impl MonsterRecord {
    /// Hit points as a whole number, for auto-filling trackers.
    pub fn hit_points(&self) -> Option<i32> {
        self.hp.map(|v| v.round() as i32)
    }

    pub fn armor_class(&self) -> Option<i32> {
        self.ac.map(|v| v.round() as i32)
    }

    pub fn alignment_label(&self) -> String {
        alignment_label(&self.align)
    }
}

/// Expand an alignment code; unknown codes are returned unchanged.
pub fn alignment_label(code: &str) -> String {
    let label = match code.trim().to_ascii_uppercase().as_str() {
        "LG" => "Lawful Good",
        "NG" => "Neutral Good",
        "CG" => "Chaotic Good",
        "LN" => "Lawful Neutral",
        "N" => "True Neutral",
        "CN" => "Chaotic Neutral",
        "LE" => "Lawful Evil",
        "NE" => "Neutral Evil",
        "CE" => "Chaotic Evil",
        "U" => "Unaligned",
        "ANY" => "Any Alignment",
        "ANY EVIL" => "Any Evil Alignment",
        _ => return code.to_string(),
    };
    label.to_string()
}

/// Leading number of a cell: `"45 (6d10+12)"` → 45, `"1/4"` → 0.25.
pub fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '/'))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let token = &text[..end];
    if token.is_empty() {
        return None;
    }
    match token.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => token.parse().ok(),
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<Cell>::deserialize(deserializer)? {
        Some(Cell::Number(n)) if n.is_finite() => Some(n),
        Some(Cell::Text(s)) => leading_number(&s),
        _ => None,
    })
}

/// Parse a JSON array of records, dropping entries with a blank name.
pub fn from_json(text: &str) -> Result<Vec<MonsterRecord>, DatasetError> {
    let records: Vec<MonsterRecord> = serde_json::from_str(text)?;
    Ok(without_blank_names(records))
}

pub(crate) fn without_blank_names(records: Vec<MonsterRecord>) -> Vec<MonsterRecord> {
    records
        .into_iter()
        .filter(|r| !r.name.trim().is_empty())
        .collect()
}

/// Parse a tab-separated spreadsheet export.
///
/// Recognised headers: `Name`, `AC`, `HP`, `Size`, `Type`, `Align.` and
/// optionally `CR`.  `AC` must be a plain number, otherwise it is left
/// empty; `HP` keeps its leading number (`"45 (6d10+12)"` → 45).
pub fn from_sheet(text: &str) -> Result<Vec<MonsterRecord>, DatasetError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header
        .split('\t')
        .map(|h| h.trim().trim_start_matches('\u{feff}').to_string())
        .collect();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let name_col = column("Name").ok_or(DatasetError::MissingColumn("Name"))?;
    let ac_col = column("AC");
    let hp_col = column("HP");
    let size_col = column("Size");
    let type_col = column("Type");
    let align_col = column("Align.").or_else(|| column("Align"));
    let cr_col = column("CR");

    let mut records = Vec::new();
    for line in lines {
        let cells: Vec<&str> = line.split('\t').collect();
        let cell = |idx: Option<usize>| sheet_cell(&cells, idx);

        let name = cell(Some(name_col));
        if name.is_empty() {
            continue;
        }
        records.push(MonsterRecord {
            name: name.to_string(),
            ac: cell(ac_col).parse::<f64>().ok().filter(|v| v.is_finite()),
            hp: leading_number(cell(hp_col)),
            size: cell(size_col).to_string(),
            kind: cell(type_col).to_string(),
            align: cell(align_col).to_string(),
            cr: leading_number(cell(cr_col)),
            ..MonsterRecord::default()
        });
    }
    Ok(records)
}

fn sheet_cell<'a>(cells: &[&'a str], idx: Option<usize>) -> &'a str {
    idx.and_then(|i| cells.get(i))
        .map(|s| s.trim())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_numbers_strings_and_blanks() {
        let records = from_json(
            r#"[
                {"name": "Goblin", "size": "S", "type": "humanoid", "align": "NE",
                 "ac": 15, "hp": "7 (2d6)", "cr": "1/4", "str": 8, "dex": "14"},
                {"name": "", "ac": 10},
                {"name": "Ooze", "ac": "", "hp": null, "cr": 0.5}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);

        let goblin = &records[0];
        assert_eq!(goblin.kind, "humanoid");
        assert_eq!(goblin.armor_class(), Some(15));
        assert_eq!(goblin.hit_points(), Some(7));
        assert_eq!(goblin.cr, Some(0.25));
        assert_eq!(goblin.dexterity, Some(14.0));
        assert_eq!(goblin.alignment_label(), "Neutral Evil");

        let ooze = &records[1];
        assert_eq!(ooze.ac, None);
        assert_eq!(ooze.hp, None);
        assert_eq!(ooze.cr, Some(0.5));
    }

    #[test]
    fn test_alignment_labels() {
        assert_eq!(alignment_label("LG"), "Lawful Good");
        assert_eq!(alignment_label("any evil"), "Any Evil Alignment");
        assert_eq!(alignment_label("U"), "Unaligned");
        assert_eq!(alignment_label("LN or LE"), "LN or LE");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("45 (6d10+12)"), Some(45.0));
        assert_eq!(leading_number("1/8"), Some(0.125));
        assert_eq!(leading_number("  12"), Some(12.0));
        assert_eq!(leading_number("1/0"), None);
        assert_eq!(leading_number("varies"), None);
        assert_eq!(leading_number(""), None);
    }

    #[test]
    fn test_sheet_export() {
        let sheet = "Name\tAC\tHP\tSize\tType\tAlign.\tCR\n\
                     Goblin\t15\t7 (2d6)\tS\thumanoid\tNE\t1/4\n\
                     \t12\t5\tS\tbeast\tU\t0\n\
                     Adult Red Dragon\t19 (natural armor)\t256 (19d12+133)\tH\tdragon\tCE\t17\n";
        let records = from_sheet(sheet).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Goblin");
        assert_eq!(records[0].ac, Some(15.0));
        assert_eq!(records[0].cr, Some(0.25));
        assert_eq!(records[1].ac, None);
        assert_eq!(records[1].hit_points(), Some(256));
        assert_eq!(records[1].align, "CE");
    }

    #[test]
    fn test_sheet_requires_name_column() {
        let err = from_sheet("AC\tHP\n12\t5\n").unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn("Name")));
        assert!(from_sheet("").unwrap().is_empty());
    }
}

//! Synthetic cell values for bulk population.
//!
//! Values are picked from column name/type heuristics: a column whose name
//! suggests an email address gets a synthetic address, one suggesting a
//! person gets a full name, numeric columns get an integer in a fixed
//! range, and everything else gets a generic word.

use rand::Rng;

use crate::model::Column;
use crate::model::ColumnType;

/// Lower bound of synthesized numeric values.
pub const SYNTH_NUMBER_MIN: i64 = 18;
/// Upper bound of synthesized numeric values.
pub const SYNTH_NUMBER_MAX: i64 = 60;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Dennis", "Donald", "Edsger", "Frances", "Grace",
    "Hedy", "John", "Katherine", "Ken", "Leslie", "Margaret", "Niklaus", "Radia", "Robin",
    "Tim", "Vint",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Berners-Lee", "Cerf", "Dijkstra", "Hamilton", "Hopper", "Johnson", "Kernighan",
    "Knuth", "Lamarr", "Lamport", "Liskov", "Lovelace", "McCarthy", "Milner", "Perlman",
    "Ritchie", "Shannon", "Thompson", "Wirth",
];

const WORDS: &[&str] = &[
    "alpha", "beacon", "cedar", "delta", "ember", "fjord", "garnet", "harbor", "indigo",
    "juniper", "kestrel", "lumen", "meadow", "nimbus", "onyx", "prairie", "quartz", "russet",
    "summit", "thicket", "umber", "vesper", "willow", "zephyr",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net", "mail.test"];

/// Column names that suggest an email address. `"mail"` also covers
/// "email" and "e-mail".
fn suggests_email(name: &str) -> bool {
    name.contains("mail")
}

/// Column names that suggest a person.
fn suggests_person(name: &str) -> bool {
    ["name", "person", "contact", "author", "owner"]
        .iter()
        .any(|hint| name.contains(hint))
}

/// Synthesizes a value for the given column.
///
/// Name heuristics win over the type tag, so a NUMBER column named
/// "Contact" still gets a person name. The heuristic mirrors how the
/// columns were presumably meant, not how they were declared.
pub fn synthesize_value<R: Rng + ?Sized>(rng: &mut R, column: &Column) -> String {
    let name = column.name.to_lowercase();
    if suggests_email(&name) {
        return synthetic_email(rng);
    }
    if suggests_person(&name) {
        return synthetic_full_name(rng);
    }
    match column.column_type {
        ColumnType::Number => rng.random_range(SYNTH_NUMBER_MIN..=SYNTH_NUMBER_MAX).to_string(),
        ColumnType::Text => pick(rng, WORDS).to_string(),
    }
}

fn pick<'s, R: Rng + ?Sized>(rng: &mut R, options: &[&'s str]) -> &'s str {
    options[rng.random_range(0..options.len())]
}

fn synthetic_full_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

fn synthetic_email<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{}.{}{}@{}",
        pick(rng, FIRST_NAMES).to_lowercase(),
        pick(rng, LAST_NAMES).to_lowercase(),
        rng.random_range(1..1000),
        pick(rng, EMAIL_DOMAINS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn column(name: &str, column_type: ColumnType) -> Column {
        Column::new(Uuid::new_v4(), name, column_type)
    }

    #[test]
    fn email_columns_get_addresses() {
        let mut rng = rand::rng();
        for name in ["Email", "e-mail", "Work Mail"] {
            let value = synthesize_value(&mut rng, &column(name, ColumnType::Text));
            assert!(value.contains('@'), "{name}: {value}");
        }
    }

    #[test]
    fn person_columns_get_full_names() {
        let mut rng = rand::rng();
        let value = synthesize_value(&mut rng, &column("Name", ColumnType::Text));
        let mut parts = value.split(' ');
        assert!(FIRST_NAMES.contains(&parts.next().unwrap()));
        assert!(LAST_NAMES.contains(&parts.next().unwrap()));
    }

    #[test]
    fn number_columns_get_integers_in_range() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let value = synthesize_value(&mut rng, &column("Age", ColumnType::Number));
            let n: i64 = value.parse().expect("numeric value");
            assert!((SYNTH_NUMBER_MIN..=SYNTH_NUMBER_MAX).contains(&n));
        }
    }

    #[test]
    fn other_text_columns_get_words() {
        let mut rng = rand::rng();
        let value = synthesize_value(&mut rng, &column("Notes", ColumnType::Text));
        assert!(WORDS.contains(&value.as_str()));
    }

    #[test]
    fn name_heuristics_win_over_the_type_tag() {
        let mut rng = rand::rng();
        let value = synthesize_value(&mut rng, &column("Contact", ColumnType::Number));
        assert!(value.parse::<i64>().is_err(), "expected a name, got {value}");
    }
}

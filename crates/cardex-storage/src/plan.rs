//! Renders a [`CardQuery`] into parameterized SQLite statements.
//!
//! One predicate pass produces both the row statement and the count
//! statement, so the reported total always describes the same filtered set
//! as the returned page. User input only ever travels through bind
//! parameters; the SQL text is assembled from fixed fragments.

use cardex_core::{CardQuery, Field, Predicate, Scalar, SortDir, SortKey};
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::ToSql;

/// Parameter value for a planned statement.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanParam {
    Int(i64),
    Text(String),
}

impl ToSql for PlanParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Self::Int(v) => Ok(ToSqlOutput::Owned(Value::Integer(*v))),
            Self::Text(v) => Ok(ToSqlOutput::Borrowed(v.as_str().into())),
        }
    }
}

/// A fully rendered statement pair for one catalog query.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub rows_sql: String,
    pub rows_params: Vec<PlanParam>,
    pub count_sql: String,
    pub count_params: Vec<PlanParam>,
}

/// Rarity ordering used by the catalog sort. Unknown and missing rarities
/// rank after every known one.
pub(crate) const RARITY_RANK_SQL: &str = "CASE c.rarity \
     WHEN 'rare_secret' THEN 1 \
     WHEN 'rare_ultra' THEN 2 \
     WHEN 'rare_shiny' THEN 3 \
     WHEN 'special_illustration_rare' THEN 4 \
     WHEN 'rare_holo' THEN 5 \
     WHEN 'rare' THEN 6 \
     WHEN 'uncommon' THEN 7 \
     WHEN 'common' THEN 8 \
     ELSE 9 END";

/// Competitive tier ordering. Unrated cards rank last.
pub(crate) const TIER_RANK_SQL: &str = "CASE c.competitive_tier \
     WHEN 'competitive' THEN 1 \
     WHEN 'playable' THEN 2 \
     WHEN 'casual' THEN 3 \
     ELSE 4 END";

/// Relevance weighting for full-scope text search: a name hit counts 10,
/// a hit in any attack effect 5, a hit in any ability effect 5. Each
/// surface contributes at most once. Takes three pattern parameters.
const RELEVANCE_SQL: &str = "CASE WHEN c.name LIKE ? ESCAPE '\\' THEN 10 ELSE 0 END \
     + CASE WHEN EXISTS (SELECT 1 FROM attacks a WHERE a.card_id = c.id \
         AND a.effect LIKE ? ESCAPE '\\') THEN 5 ELSE 0 END \
     + CASE WHEN EXISTS (SELECT 1 FROM abilities ab WHERE ab.card_id = c.id \
         AND ab.effect LIKE ? ESCAPE '\\') THEN 5 ELSE 0 END";

/// Filter counterpart of [`RELEVANCE_SQL`]: true exactly when the relevance
/// score would be positive. Takes the same three pattern parameters.
const ANY_TEXT_MATCH_SQL: &str = "(c.name LIKE ? ESCAPE '\\' \
     OR EXISTS (SELECT 1 FROM attacks a WHERE a.card_id = c.id \
         AND a.effect LIKE ? ESCAPE '\\') \
     OR EXISTS (SELECT 1 FROM abilities ab WHERE ab.card_id = c.id \
         AND ab.effect LIKE ? ESCAPE '\\'))";

/// Escape LIKE wildcards in user text. Every rendered LIKE pairs its
/// pattern with `ESCAPE '\'`.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Substring pattern for a case-insensitive contains match.
pub fn contains_pattern(text: &str) -> String {
    format!("%{}%", escape_like(text))
}

/// Build the row and count statements for a catalog query.
pub fn build_plan(query: &CardQuery) -> QueryPlan {
    let preds = query.predicates();

    // Full-scope text drives the relevance column; the select list renders
    // before WHERE, so its parameters bind first.
    let search_text = preds.iter().find_map(|p| match p {
        Predicate::MatchesAnyText(text) => Some(text.clone()),
        _ => None,
    });

    let mut core_sql =
        String::from("SELECT c.*, GROUP_CONCAT(DISTINCT ct.type) AS type_list, ");
    let mut core_params: Vec<PlanParam> = Vec::new();

    if let Some(text) = &search_text {
        let pattern = contains_pattern(text);
        core_sql.push('(');
        core_sql.push_str(RELEVANCE_SQL);
        core_sql.push_str(") AS relevance");
        for _ in 0..3 {
            core_params.push(PlanParam::Text(pattern.clone()));
        }
    } else {
        core_sql.push_str("0 AS relevance");
    }

    core_sql.push_str(" FROM cards c LEFT JOIN card_types ct ON ct.card_id = c.id");

    let mut where_clauses: Vec<String> = Vec::new();
    let mut having_clauses: Vec<String> = Vec::new();
    let mut where_params: Vec<PlanParam> = Vec::new();
    let mut having_params: Vec<PlanParam> = Vec::new();

    for pred in &preds {
        match pred {
            Predicate::Eq(field, value) => {
                where_clauses.push(format!("{} = ?", column(*field)));
                where_params.push(param_from(value));
            }
            Predicate::InSet(field, values) => {
                if values.is_empty() {
                    where_clauses.push("1 = 0".to_string());
                } else {
                    where_clauses.push(format!(
                        "{} IN ({})",
                        column(*field),
                        placeholders(values.len())
                    ));
                    where_params.extend(values.iter().map(param_from));
                }
            }
            Predicate::Range { field, min, max } => {
                if let Some(min) = min {
                    where_clauses.push(format!("{} >= ?", column(*field)));
                    where_params.push(PlanParam::Int(*min));
                }
                if let Some(max) = max {
                    where_clauses.push(format!("{} <= ?", column(*field)));
                    where_params.push(PlanParam::Int(*max));
                }
            }
            Predicate::ContainsText(field, text) => {
                where_clauses.push(format!("{} LIKE ? ESCAPE '\\'", column(*field)));
                where_params.push(PlanParam::Text(contains_pattern(text)));
            }
            Predicate::MatchesAnyText(text) => {
                where_clauses.push(ANY_TEXT_MATCH_SQL.to_string());
                let pattern = contains_pattern(text);
                for _ in 0..3 {
                    where_params.push(PlanParam::Text(pattern.clone()));
                }
            }
            Predicate::HasAbility => {
                where_clauses.push(
                    "EXISTS (SELECT 1 FROM abilities ab WHERE ab.card_id = c.id)".to_string(),
                );
            }
            Predicate::HasAnyType(tags) => {
                // Evaluated after aggregation so multi-typed cards keep
                // their full tag list in the result.
                if tags.is_empty() {
                    having_clauses.push("1 = 0".to_string());
                } else {
                    having_clauses.push(format!(
                        "SUM(CASE WHEN ct.type IN ({}) THEN 1 ELSE 0 END) > 0",
                        placeholders(tags.len())
                    ));
                    having_params
                        .extend(tags.iter().map(|t| PlanParam::Text(t.clone())));
                }
            }
        }
    }

    if !where_clauses.is_empty() {
        core_sql.push_str(" WHERE ");
        core_sql.push_str(&where_clauses.join(" AND "));
    }
    core_sql.push_str(" GROUP BY c.id");
    if !having_clauses.is_empty() {
        core_sql.push_str(" HAVING ");
        core_sql.push_str(&having_clauses.join(" AND "));
    }
    core_params.extend(where_params);
    core_params.extend(having_params);

    let count_sql = format!("SELECT COUNT(*) FROM ({core_sql}) matched");
    let count_params = core_params.clone();

    let rows_sql = format!(
        "{core_sql} ORDER BY {} LIMIT ? OFFSET ?",
        order_clause(query.sort, query.dir)
    );
    let mut rows_params = core_params;
    rows_params.push(PlanParam::Int(query.page.limit as i64));
    rows_params.push(PlanParam::Int(query.page.offset as i64));

    QueryPlan {
        rows_sql,
        rows_params,
        count_sql,
        count_params,
    }
}

fn column(field: Field) -> &'static str {
    match field {
        Field::Name => "c.name",
        Field::SetId => "c.set_id",
        Field::Rarity => "c.rarity",
        Field::Hp => "c.hp",
        Field::RetreatCost => "c.retreat_cost",
        Field::CompetitiveTier => "c.competitive_tier",
        Field::FormatLegal => "c.format_legal",
    }
}

fn param_from(scalar: &Scalar) -> PlanParam {
    match scalar {
        Scalar::Int(v) => PlanParam::Int(*v),
        Scalar::Text(v) => PlanParam::Text(v.clone()),
        Scalar::Bool(v) => PlanParam::Int(i64::from(*v)),
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// ORDER BY fragment for a sort key. Rank-table sorts carry a name
/// tiebreak; nullable numeric columns always sort missing values last.
/// Relevance ordering is fixed regardless of the requested direction.
fn order_clause(sort: SortKey, dir: SortDir) -> String {
    let dir = match dir {
        SortDir::Asc => "ASC",
        SortDir::Desc => "DESC",
    };
    match sort {
        SortKey::Name => format!("c.name COLLATE NOCASE {dir}"),
        SortKey::CardNumber => format!("CAST(c.card_number AS INTEGER) {dir}"),
        SortKey::Rarity => format!("{RARITY_RANK_SQL} {dir}, c.name COLLATE NOCASE ASC"),
        SortKey::CompetitiveRating => {
            format!("{TIER_RANK_SQL} {dir}, c.name COLLATE NOCASE ASC")
        }
        SortKey::Hp => format!("(c.hp IS NULL) ASC, c.hp {dir}"),
        SortKey::RetreatCost => {
            format!("(c.retreat_cost IS NULL) ASC, c.retreat_cost {dir}")
        }
        SortKey::Set => format!("c.set_id {dir}, CAST(c.card_number AS INTEGER) {dir}"),
        SortKey::Newest => format!("c.created_at {dir}"),
        SortKey::Relevance => {
            format!("relevance DESC, {TIER_RANK_SQL} ASC, c.name COLLATE NOCASE ASC")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardex_core::{CompetitiveTier, PageRequest, Rarity, TextScope};

    fn placeholder_count(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn test_legality_gate_always_rendered() {
        let plan = build_plan(&CardQuery::new());
        assert!(plan.rows_sql.contains("c.format_legal = ?"));
        assert!(plan.count_sql.contains("c.format_legal = ?"));
        assert_eq!(plan.count_params[0], PlanParam::Int(1));
    }

    #[test]
    fn test_placeholders_match_params() {
        let query = CardQuery::new()
            .with_text("dragon")
            .with_text_scope(TextScope::Full)
            .with_type("fire")
            .with_type("water")
            .with_rarity(Rarity::Rare)
            .with_set("sv3")
            .with_hp_min(60)
            .with_hp_max(200)
            .with_retreat_max(2)
            .with_tier(CompetitiveTier::Playable);
        let plan = build_plan(&query);
        assert_eq!(placeholder_count(&plan.rows_sql), plan.rows_params.len());
        assert_eq!(placeholder_count(&plan.count_sql), plan.count_params.len());
    }

    #[test]
    fn test_count_shares_predicate_params() {
        let query = CardQuery::new()
            .with_text("pidgeot")
            .with_text_scope(TextScope::Full)
            .with_hp_min(100);
        let plan = build_plan(&query);
        // Row params are the count params plus the window.
        assert_eq!(
            plan.rows_params[..plan.rows_params.len() - 2],
            plan.count_params[..]
        );
        let window = &plan.rows_params[plan.rows_params.len() - 2..];
        assert_eq!(window, &[PlanParam::Int(50), PlanParam::Int(0)]);
    }

    #[test]
    fn test_user_text_never_lands_in_sql() {
        let query = CardQuery::new().with_text("50%_\\' OR 1=1 --");
        let plan = build_plan(&query);
        assert!(!plan.rows_sql.contains("50%"));
        assert!(!plan.rows_sql.contains("OR 1=1"));
        // Param 0 is the legality gate; the pattern binds right after it.
        match &plan.rows_params[1] {
            PlanParam::Text(pattern) => {
                assert!(pattern.starts_with('%'));
                assert!(pattern.contains("50\\%\\_\\\\"));
            }
            other => panic!("expected text pattern, got {other:?}"),
        }
    }

    #[test]
    fn test_type_filter_renders_after_aggregation() {
        let plan = build_plan(&CardQuery::new().with_type("fire").with_type("dragon"));
        let group = plan.rows_sql.find("GROUP BY").unwrap();
        let having = plan.rows_sql.find("HAVING").unwrap();
        assert!(having > group);
        assert!(plan.rows_sql.contains("ct.type IN (?, ?)"));
    }

    #[test]
    fn test_relevance_order_is_fixed() {
        let asc = build_plan(
            &CardQuery::new()
                .with_text("draw")
                .with_text_scope(TextScope::Full)
                .sort_by(SortKey::Relevance, SortDir::Asc),
        );
        let desc = build_plan(
            &CardQuery::new()
                .with_text("draw")
                .with_text_scope(TextScope::Full)
                .sort_by(SortKey::Relevance, SortDir::Desc),
        );
        let order_of = |sql: &str| sql[sql.find("ORDER BY").unwrap()..].to_string();
        assert_eq!(order_of(&asc.rows_sql), order_of(&desc.rows_sql));
        assert!(asc.rows_sql.contains("relevance DESC"));
    }

    #[test]
    fn test_rank_sorts_carry_name_tiebreak() {
        let rarity = build_plan(&CardQuery::new().sort_by(SortKey::Rarity, SortDir::Asc));
        assert!(rarity.rows_sql.contains("'rare_secret' THEN 1"));
        assert!(rarity
            .rows_sql
            .contains("ASC, c.name COLLATE NOCASE ASC LIMIT"));

        // Plain column sorts do not get the tiebreak.
        let hp = build_plan(&CardQuery::new().sort_by(SortKey::Hp, SortDir::Desc));
        assert!(hp.rows_sql.contains("(c.hp IS NULL) ASC, c.hp DESC"));
        assert!(!hp.rows_sql.contains("c.name COLLATE NOCASE"));
    }

    #[test]
    fn test_window_renders_from_page_request() {
        let query = CardQuery::new().with_page(PageRequest {
            limit: 25,
            offset: 75,
        });
        let plan = build_plan(&query);
        let tail = &plan.rows_params[plan.rows_params.len() - 2..];
        assert_eq!(tail, &[PlanParam::Int(25), PlanParam::Int(75)]);
        assert!(plan.rows_sql.ends_with("LIMIT ? OFFSET ?"));
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(contains_pattern("ex"), "%ex%");
    }
}

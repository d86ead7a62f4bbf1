//! SQLite card store

use crate::error::{StorageError, StorageResult};
use crate::plan::{build_plan, contains_pattern, TIER_RANK_SQL};
use crate::traits::CardStore;
use async_trait::async_trait;
use cardex_core::{
    Ability, Attack, Card, CardQuery, CardSummary, RelatedCardSummary, RelatedEdge, SetOption,
};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// Base select for card rows: every card column plus the aggregated type
/// tag list. Queries built on top of this must keep the `c` alias and
/// group by `c.id`.
const CARD_SELECT: &str = "SELECT c.*, GROUP_CONCAT(DISTINCT ct.type) AS type_list \
     FROM cards c LEFT JOIN card_types ct ON ct.card_id = c.id";

/// SQLite card store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path).map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;

        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing)
    pub fn in_memory() -> StorageResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StorageError::Database(e.to_string()))?;

        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;

        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        conn.busy_timeout(Duration::from_secs(5))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                set_id TEXT NOT NULL,
                set_name TEXT NOT NULL,
                card_number TEXT NOT NULL,
                rarity TEXT,
                hp INTEGER,
                retreat_cost INTEGER,
                format_legal INTEGER NOT NULL DEFAULT 1,
                competitive_tier TEXT,
                image_url TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS card_types (
                card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
                type TEXT NOT NULL,
                PRIMARY KEY (card_id, type)
            );

            CREATE TABLE IF NOT EXISTS attacks (
                card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                name TEXT NOT NULL,
                cost TEXT NOT NULL DEFAULT '[]',
                damage TEXT,
                effect TEXT,
                PRIMARY KEY (card_id, position)
            );

            CREATE TABLE IF NOT EXISTS abilities (
                card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                effect TEXT,
                kind TEXT
            );

            CREATE TABLE IF NOT EXISTS related_cards (
                card_id TEXT NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
                related_card_id TEXT NOT NULL,
                relevance INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (card_id, related_card_id)
            );

            CREATE INDEX IF NOT EXISTS idx_cards_name ON cards (name);
            CREATE INDEX IF NOT EXISTS idx_cards_set_id ON cards (set_id);
            CREATE INDEX IF NOT EXISTS idx_cards_format_legal ON cards (format_legal);
            CREATE INDEX IF NOT EXISTS idx_card_types_type ON card_types (type);
            CREATE INDEX IF NOT EXISTS idx_attacks_card_id ON attacks (card_id);
            CREATE INDEX IF NOT EXISTS idx_abilities_card_id ON abilities (card_id);
            CREATE INDEX IF NOT EXISTS idx_related_cards_related ON related_cards (related_card_id);
            "#,
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

/// Map one joined card row. Unknown rarity or tier labels read as absent
/// rather than failing the whole row.
fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    let rarity = row
        .get::<_, Option<String>>("rarity")?
        .and_then(|raw| raw.parse().ok());
    let competitive_tier = row
        .get::<_, Option<String>>("competitive_tier")?
        .and_then(|raw| raw.parse().ok());
    // GROUP_CONCAT order is unspecified; the tag list is sorted, matching
    // the set order the domain type keeps.
    let mut types: Vec<String> = row
        .get::<_, Option<String>>("type_list")?
        .map(|list| list.split(',').map(str::to_string).collect())
        .unwrap_or_default();
    types.sort();

    Ok(Card {
        id: row.get("id")?,
        name: row.get("name")?,
        set_id: row.get("set_id")?,
        set_name: row.get("set_name")?,
        card_number: row.get("card_number")?,
        rarity,
        types,
        hp: row.get("hp")?,
        retreat_cost: row.get("retreat_cost")?,
        format_legal: row.get("format_legal")?,
        competitive_tier,
        image_url: row.get("image_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[async_trait]
impl CardStore for SqliteStore {
    async fn health_check(&self) -> StorageResult<bool> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        conn.query_row("SELECT 1", [], |_| Ok(()))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(true)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Catalog Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn list_cards(&self, query: &CardQuery) -> StorageResult<(Vec<Card>, usize)> {
        let plan = build_plan(query);
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(&plan.rows_sql)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(plan.rows_params.iter()), card_from_row)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut cards = Vec::new();
        for row in rows {
            cards.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        let total: i64 = conn
            .query_row(
                &plan.count_sql,
                params_from_iter(plan.count_params.iter()),
                |row| row.get(0),
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tracing::debug!(rows = cards.len(), total, "catalog query executed");
        Ok((cards, total as usize))
    }

    async fn get_card(&self, id: &str) -> StorageResult<Option<Card>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let sql = format!("{CARD_SELECT} WHERE c.id = ?1 GROUP BY c.id");
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        match stmt.query_row(params![id], card_from_row) {
            Ok(card) => Ok(Some(card)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Database(e.to_string())),
        }
    }

    async fn attacks_for(&self, card_id: &str) -> StorageResult<Vec<Attack>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT position, name, cost, damage, effect FROM attacks \
                 WHERE card_id = ?1 ORDER BY position",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![card_id], |row| {
                Ok((
                    row.get::<_, i32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut attacks = Vec::new();
        for row in rows {
            let (position, name, cost_json, damage, effect) =
                row.map_err(|e| StorageError::Database(e.to_string()))?;
            let cost: Vec<String> = serde_json::from_str(&cost_json)?;
            attacks.push(Attack {
                card_id: card_id.to_string(),
                position,
                name,
                cost,
                damage,
                effect,
            });
        }

        Ok(attacks)
    }

    async fn abilities_for(&self, card_id: &str) -> StorageResult<Vec<Ability>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT name, effect, kind FROM abilities WHERE card_id = ?1")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![card_id], |row| {
                Ok(Ability {
                    card_id: card_id.to_string(),
                    name: row.get(0)?,
                    effect: row.get(1)?,
                    kind: row.get(2)?,
                })
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut abilities = Vec::new();
        for row in rows {
            abilities.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(abilities)
    }

    async fn related_for(
        &self,
        card_id: &str,
        limit: usize,
    ) -> StorageResult<Vec<RelatedCardSummary>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.name, c.image_url, rc.relevance \
                 FROM related_cards rc JOIN cards c ON c.id = rc.related_card_id \
                 WHERE rc.card_id = ?1 \
                 ORDER BY rc.relevance DESC, c.name COLLATE NOCASE \
                 LIMIT ?2",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![card_id, limit as i64], |row| {
                Ok(RelatedCardSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    image_url: row.get(2)?,
                    relevance_score: row.get(3)?,
                })
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut related = Vec::new();
        for row in rows {
            related.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(related)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Autocomplete and Filter Metadata
    // ─────────────────────────────────────────────────────────────────────────

    async fn autocomplete_candidates(&self) -> StorageResult<Vec<CardSummary>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, name, set_name, card_number, image_url, competitive_tier \
                 FROM cards WHERE format_legal = 1 ORDER BY name COLLATE NOCASE",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let competitive_tier = row
                    .get::<_, Option<String>>(5)?
                    .and_then(|raw| raw.parse().ok());
                Ok(CardSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    set_name: row.get(2)?,
                    card_number: row.get(3)?,
                    image_url: row.get(4)?,
                    competitive_tier,
                })
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(candidates)
    }

    async fn distinct_types(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare("SELECT DISTINCT type FROM card_types ORDER BY type")
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut types = Vec::new();
        for row in rows {
            types.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(types)
    }

    async fn distinct_rarities(&self) -> StorageResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT rarity FROM cards WHERE rarity IS NOT NULL ORDER BY rarity",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut rarities = Vec::new();
        for row in rows {
            rarities.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(rarities)
    }

    async fn distinct_sets(&self) -> StorageResult<Vec<SetOption>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT set_id, set_name FROM cards \
                 WHERE format_legal = 1 ORDER BY set_name",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SetOption {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut sets = Vec::new();
        for row in rows {
            sets.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(sets)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Relationship Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn legal_cards_by_names(&self, names: &[String]) -> StorageResult<Vec<Card>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            "{CARD_SELECT} WHERE c.format_legal = 1 AND c.name IN ({placeholders}) \
             GROUP BY c.id ORDER BY c.name COLLATE NOCASE, c.id"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(names.iter()), card_from_row)
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut cards = Vec::new();
        for row in rows {
            cards.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(cards)
    }

    async fn related_by_source_name(
        &self,
        fragment: &str,
        limit: usize,
    ) -> StorageResult<Vec<(Card, i32)>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        // A target related to several matching sources appears once, under
        // its strongest edge.
        let mut stmt = conn
            .prepare(
                "SELECT c.*, GROUP_CONCAT(DISTINCT ct.type) AS type_list, \
                     MAX(rc.relevance) AS edge_relevance \
                 FROM cards source \
                 JOIN related_cards rc ON rc.card_id = source.id \
                 JOIN cards c ON c.id = rc.related_card_id \
                 LEFT JOIN card_types ct ON ct.card_id = c.id \
                 WHERE source.name LIKE ?1 ESCAPE '\\' AND c.format_legal = 1 \
                 GROUP BY c.id \
                 ORDER BY edge_relevance DESC, c.name COLLATE NOCASE \
                 LIMIT ?2",
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let pattern = contains_pattern(fragment);
        let rows = stmt
            .query_map(params![pattern, limit as i64], |row| {
                Ok((card_from_row(row)?, row.get::<_, i32>("edge_relevance")?))
            })
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut related = Vec::new();
        for row in rows {
            related.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(related)
    }

    async fn top_rated_names(&self, limit: usize) -> StorageResult<Vec<String>> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let sql = format!(
            "SELECT c.name FROM cards c \
             WHERE c.format_legal = 1 \
                 AND c.competitive_tier IN ('competitive', 'playable') \
             ORDER BY {TIER_RANK_SQL}, c.name COLLATE NOCASE \
             LIMIT ?1"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))
            .map_err(|e| StorageError::Database(e.to_string()))?;

        let mut names = Vec::new();
        for row in rows {
            names.push(row.map_err(|e| StorageError::Database(e.to_string()))?);
        }

        Ok(names)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Import Operations
    // ─────────────────────────────────────────────────────────────────────────

    async fn upsert_card(&self, card: &Card) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.execute(
            "INSERT INTO cards (id, name, set_id, set_name, card_number, rarity, hp, \
                 retreat_cost, format_legal, competitive_tier, image_url, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
             ON CONFLICT(id) DO UPDATE SET \
                 name = excluded.name, set_id = excluded.set_id, \
                 set_name = excluded.set_name, card_number = excluded.card_number, \
                 rarity = excluded.rarity, hp = excluded.hp, \
                 retreat_cost = excluded.retreat_cost, format_legal = excluded.format_legal, \
                 competitive_tier = excluded.competitive_tier, image_url = excluded.image_url, \
                 updated_at = excluded.updated_at",
            params![
                card.id,
                card.name,
                card.set_id,
                card.set_name,
                card.card_number,
                card.rarity.map(|r| r.as_str()),
                card.hp,
                card.retreat_cost,
                card.format_legal,
                card.competitive_tier.map(|t| t.as_str()),
                card.image_url,
                card.created_at,
                card.updated_at,
            ],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.execute("DELETE FROM card_types WHERE card_id = ?1", params![card.id])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        for tag in &card.types {
            tx.execute(
                "INSERT INTO card_types (card_id, type) VALUES (?1, ?2)",
                params![card.id, tag],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn replace_attacks(&self, card_id: &str, attacks: &[Attack]) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.execute("DELETE FROM attacks WHERE card_id = ?1", params![card_id])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        for attack in attacks {
            let cost = serde_json::to_string(&attack.cost)?;
            tx.execute(
                "INSERT INTO attacks (card_id, position, name, cost, damage, effect) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    card_id,
                    attack.position,
                    attack.name,
                    cost,
                    attack.damage,
                    attack.effect
                ],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn replace_abilities(
        &self,
        card_id: &str,
        abilities: &[Ability],
    ) -> StorageResult<()> {
        let mut conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        tx.execute("DELETE FROM abilities WHERE card_id = ?1", params![card_id])
            .map_err(|e| StorageError::Database(e.to_string()))?;
        for ability in abilities {
            tx.execute(
                "INSERT INTO abilities (card_id, name, effect, kind) VALUES (?1, ?2, ?3, ?4)",
                params![card_id, ability.name, ability.effect, ability.kind],
            )
            .map_err(|e| StorageError::Database(e.to_string()))?;
        }

        tx.commit().map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }

    async fn add_related(&self, edge: &RelatedEdge) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|e| StorageError::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO related_cards (card_id, related_card_id, relevance) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(card_id, related_card_id) DO UPDATE SET \
                 relevance = excluded.relevance",
            params![edge.card_id, edge.related_card_id, edge.relevance],
        )
        .map_err(|e| StorageError::Database(e.to_string()))?;

        Ok(())
    }
}

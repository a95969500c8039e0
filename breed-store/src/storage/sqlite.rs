//! SQLite storage backend for the breed catalog.

use super::{BreedStore, CursorStore, FavoriteStore};
use crate::error::StorageError;
use async_trait::async_trait;
use breed_types::{Breed, BreedId, FavoriteRecord, Image, Weight};
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Columns of the `breeds` table, in bind order.
const BREED_COLUMNS: [&str; 42] = [
    "id",
    "name",
    "weight_imperial",
    "weight_metric",
    "cfa_url",
    "vetstreet_url",
    "vcahospitals_url",
    "temperament",
    "origin",
    "country_codes",
    "country_code",
    "description",
    "life_span",
    "alt_names",
    "wikipedia_url",
    "reference_image_id",
    "image_id",
    "image_width",
    "image_height",
    "image_url",
    "indoor",
    "lap",
    "adaptability",
    "affection_level",
    "child_friendly",
    "dog_friendly",
    "energy_level",
    "grooming",
    "health_issues",
    "intelligence",
    "shedding_level",
    "social_needs",
    "stranger_friendly",
    "vocalisation",
    "experimental",
    "hairless",
    "natural_breed",
    "rare",
    "rex",
    "suppressed_tail",
    "short_legs",
    "hypoallergenic",
];

/// SQLite-based breed, favorite and cursor storage.
///
/// Uses WAL mode for concurrent reads/writes. Writes are serialized through
/// a single lock and each one republishes the affected snapshot before the
/// lock is released, so subscribers observe writes in order.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    breeds_tx: Arc<watch::Sender<Vec<Breed>>>,
    favorites_tx: Arc<watch::Sender<Vec<FavoriteRecord>>>,
    write_lock: Arc<Mutex<()>>,
}

impl SqliteStore {
    /// Open a store backed by a database file.
    ///
    /// Creates the database file if it doesn't exist.
    pub async fn new(path: &Path) -> Result<Self, StorageError> {
        let url = path.to_str().ok_or_else(|| StorageError::InvalidPath {
            path: path.to_path_buf(),
        })?;

        let options = SqliteConnectOptions::from_str(url)
            .map_err(StorageError::Database)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        Self::from_pool(pool).await
    }

    /// Create an in-memory store (for testing).
    pub async fn in_memory() -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(":memory:")
            .map_err(StorageError::Database)?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        // A single connection that never expires, or the database goes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(StorageError::Database)?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let (breeds_tx, _) = watch::channel(Vec::new());
        let (favorites_tx, _) = watch::channel(Vec::new());

        let store = Self {
            pool,
            breeds_tx: Arc::new(breeds_tx),
            favorites_tx: Arc::new(favorites_tx),
            write_lock: Arc::new(Mutex::new(())),
        };
        store.run_migrations().await?;
        store.publish_breeds().await?;
        store.publish_favorites().await?;
        Ok(store)
    }

    /// Run database migrations.
    async fn run_migrations(&self) -> Result<(), StorageError> {
        let columns = BREED_COLUMNS
            .iter()
            .map(|col| match *col {
                "id" => "id TEXT PRIMARY KEY NOT NULL".to_string(),
                "image_width" | "image_height" => format!("{col} INTEGER NOT NULL DEFAULT 0"),
                _ if is_text_column(col) => format!("{col} TEXT NOT NULL DEFAULT ''"),
                _ => format!("{col} INTEGER NOT NULL DEFAULT 0"),
            })
            .collect::<Vec<_>>()
            .join(",\n    ");

        sqlx::query(&format!("CREATE TABLE IF NOT EXISTS breeds (\n    {columns}\n)"))
            .execute(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id TEXT PRIMARY KEY NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY NOT NULL,
                value INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_breeds_name ON breeds(name)")
            .execute(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_favorites_created ON favorites(created_at DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(())
    }

    async fn load_breeds(&self) -> Result<Vec<Breed>, StorageError> {
        let sql = format!("SELECT {} FROM breeds ORDER BY rowid ASC", BREED_COLUMNS.join(", "));
        let rows = sqlx::query_as::<_, BreedRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(decode_breeds(rows))
    }

    async fn load_favorites(&self) -> Result<Vec<FavoriteRecord>, StorageError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(
            r#"
            SELECT id, created_at
            FROM favorites
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        rows.into_iter().map(FavoriteRecord::try_from).collect()
    }

    async fn publish_breeds(&self) -> Result<(), StorageError> {
        let breeds = self.load_breeds().await?;
        debug!(count = breeds.len(), "publishing breeds snapshot");
        self.breeds_tx.send_replace(breeds);
        Ok(())
    }

    async fn publish_favorites(&self) -> Result<(), StorageError> {
        let favorites = self.load_favorites().await?;
        debug!(count = favorites.len(), "publishing favorites snapshot");
        self.favorites_tx.send_replace(favorites);
        Ok(())
    }

    async fn upsert_in(
        tx: &mut Transaction<'_, Sqlite>,
        breed: &Breed,
    ) -> Result<(), StorageError> {
        bind_breed(sqlx::query(upsert_breed_sql()), breed)
            .execute(&mut **tx)
            .await
            .map_err(StorageError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl BreedStore for SqliteStore {
    async fn upsert_breed(&self, breed: &Breed) -> Result<(), StorageError> {
        breed.validate()?;
        self.upsert_breeds(std::slice::from_ref(breed)).await
    }

    async fn upsert_breeds(&self, breeds: &[Breed]) -> Result<(), StorageError> {
        let breeds: Vec<&Breed> = breeds
            .iter()
            .filter(|breed| match breed.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "skipping breed");
                    false
                }
            })
            .collect();
        if breeds.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;

        let mut tx = self.pool.begin().await.map_err(StorageError::Database)?;
        for breed in breeds {
            Self::upsert_in(&mut tx, breed).await?;
        }
        tx.commit().await.map_err(StorageError::Database)?;

        self.publish_breeds().await
    }

    async fn search_by_name(&self, name: &str) -> Result<Vec<Breed>, StorageError> {
        let sql = format!(
            r"SELECT {} FROM breeds WHERE name LIKE ?1 ESCAPE '\' ORDER BY rowid ASC",
            BREED_COLUMNS.join(", ")
        );
        let rows = sqlx::query_as::<_, BreedRow>(&sql)
            .bind(like_pattern(name))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(decode_breeds(rows))
    }

    fn subscribe_breeds(&self) -> watch::Receiver<Vec<Breed>> {
        self.breeds_tx.subscribe()
    }
}

#[async_trait]
impl FavoriteStore for SqliteStore {
    async fn upsert_favorite(&self, record: &FavoriteRecord) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO favorites (id, created_at)
            VALUES (?1, ?2)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        self.publish_favorites().await
    }

    async fn delete_favorite(&self, id: &BreedId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let result = sqlx::query("DELETE FROM favorites WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        if result.rows_affected() > 0 {
            self.publish_favorites().await?;
        }
        Ok(())
    }

    fn subscribe_favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.favorites_tx.subscribe()
    }
}

#[async_trait]
impl CursorStore for SqliteStore {
    async fn get_cursor(&self, key: &str, default: i64) -> Result<i64, StorageError> {
        let value: Option<i64> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Database)?;

        Ok(value.unwrap_or(default))
    }

    async fn set_cursor(&self, key: &str, value: i64) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(StorageError::Database)?;

        Ok(())
    }
}

fn is_text_column(col: &str) -> bool {
    BREED_COLUMNS[..20].contains(&col)
}

fn upsert_breed_sql() -> &'static str {
    static SQL: OnceLock<String> = OnceLock::new();
    SQL.get_or_init(|| {
        let placeholders = vec!["?"; BREED_COLUMNS.len()].join(", ");
        let updates = BREED_COLUMNS[1..]
            .iter()
            .map(|col| format!("{col} = excluded.{col}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO breeds ({}) VALUES ({placeholders}) ON CONFLICT(id) DO UPDATE SET {updates}",
            BREED_COLUMNS.join(", ")
        )
    })
}

/// Bind every column of `breed` in [`BREED_COLUMNS`] order.
fn bind_breed<'q>(query: SqliteQuery<'q>, breed: &'q Breed) -> SqliteQuery<'q> {
    query
        .bind(breed.id.as_str())
        .bind(breed.name.as_str())
        .bind(breed.weight.imperial.as_str())
        .bind(breed.weight.metric.as_str())
        .bind(breed.cfa_url.as_str())
        .bind(breed.vetstreet_url.as_str())
        .bind(breed.vcahospitals_url.as_str())
        .bind(breed.temperament.as_str())
        .bind(breed.origin.as_str())
        .bind(breed.country_codes.as_str())
        .bind(breed.country_code.as_str())
        .bind(breed.description.as_str())
        .bind(breed.life_span.as_str())
        .bind(breed.alt_names.as_str())
        .bind(breed.wikipedia_url.as_str())
        .bind(breed.reference_image_id.as_str())
        .bind(breed.image.id.as_str())
        .bind(breed.image.width)
        .bind(breed.image.height)
        .bind(breed.image.url.as_str())
        .bind(breed.indoor)
        .bind(breed.lap)
        .bind(breed.adaptability)
        .bind(breed.affection_level)
        .bind(breed.child_friendly)
        .bind(breed.dog_friendly)
        .bind(breed.energy_level)
        .bind(breed.grooming)
        .bind(breed.health_issues)
        .bind(breed.intelligence)
        .bind(breed.shedding_level)
        .bind(breed.social_needs)
        .bind(breed.stranger_friendly)
        .bind(breed.vocalisation)
        .bind(breed.experimental)
        .bind(breed.hairless)
        .bind(breed.natural)
        .bind(breed.rare)
        .bind(breed.rex)
        .bind(breed.suppressed_tail)
        .bind(breed.short_legs)
        .bind(breed.hypoallergenic)
}

/// Decode breed rows, skipping any that cannot be read back so one bad row
/// does not take the whole snapshot down.
fn decode_breeds(rows: Vec<BreedRow>) -> Vec<Breed> {
    rows.into_iter()
        .filter_map(|row| match Breed::try_from(row) {
            Ok(breed) => Some(breed),
            Err(e) => {
                warn!(error = %e, "skipping unreadable breed row");
                None
            }
        })
        .collect()
}

/// `%name%` with LIKE wildcards in `name` escaped.
fn like_pattern(name: &str) -> String {
    let mut pattern = String::with_capacity(name.len() + 2);
    pattern.push('%');
    for c in name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Internal row type for `breeds` queries.
#[derive(sqlx::FromRow)]
struct BreedRow {
    id: String,
    name: String,
    weight_imperial: String,
    weight_metric: String,
    cfa_url: String,
    vetstreet_url: String,
    vcahospitals_url: String,
    temperament: String,
    origin: String,
    country_codes: String,
    country_code: String,
    description: String,
    life_span: String,
    alt_names: String,
    wikipedia_url: String,
    reference_image_id: String,
    image_id: String,
    image_width: i32,
    image_height: i32,
    image_url: String,
    indoor: i32,
    lap: i32,
    adaptability: i32,
    affection_level: i32,
    child_friendly: i32,
    dog_friendly: i32,
    energy_level: i32,
    grooming: i32,
    health_issues: i32,
    intelligence: i32,
    shedding_level: i32,
    social_needs: i32,
    stranger_friendly: i32,
    vocalisation: i32,
    experimental: i32,
    hairless: i32,
    natural_breed: i32,
    rare: i32,
    rex: i32,
    suppressed_tail: i32,
    short_legs: i32,
    hypoallergenic: i32,
}

impl TryFrom<BreedRow> for Breed {
    type Error = StorageError;

    fn try_from(row: BreedRow) -> Result<Self, Self::Error> {
        if row.id.is_empty() {
            return Err(StorageError::CorruptRow {
                table: "breeds",
                reason: "empty id".to_string(),
            });
        }

        Ok(Breed {
            id: BreedId::new(row.id),
            name: row.name,
            weight: Weight {
                imperial: row.weight_imperial,
                metric: row.weight_metric,
            },
            cfa_url: row.cfa_url,
            vetstreet_url: row.vetstreet_url,
            vcahospitals_url: row.vcahospitals_url,
            temperament: row.temperament,
            origin: row.origin,
            country_codes: row.country_codes,
            country_code: row.country_code,
            description: row.description,
            life_span: row.life_span,
            alt_names: row.alt_names,
            wikipedia_url: row.wikipedia_url,
            reference_image_id: row.reference_image_id,
            image: Image {
                id: row.image_id,
                width: row.image_width,
                height: row.image_height,
                url: row.image_url,
            },
            indoor: row.indoor,
            lap: row.lap,
            adaptability: row.adaptability,
            affection_level: row.affection_level,
            child_friendly: row.child_friendly,
            dog_friendly: row.dog_friendly,
            energy_level: row.energy_level,
            grooming: row.grooming,
            health_issues: row.health_issues,
            intelligence: row.intelligence,
            shedding_level: row.shedding_level,
            social_needs: row.social_needs,
            stranger_friendly: row.stranger_friendly,
            vocalisation: row.vocalisation,
            experimental: row.experimental,
            hairless: row.hairless,
            natural: row.natural_breed,
            rare: row.rare,
            rex: row.rex,
            suppressed_tail: row.suppressed_tail,
            short_legs: row.short_legs,
            hypoallergenic: row.hypoallergenic,
        })
    }
}

/// Internal row type for `favorites` queries.
#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: String,
    created_at: i64,
}

impl TryFrom<FavoriteRow> for FavoriteRecord {
    type Error = StorageError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        if row.id.is_empty() {
            return Err(StorageError::CorruptRow {
                table: "favorites",
                reason: "empty id".to_string(),
            });
        }
        Ok(FavoriteRecord::at(row.id, row.created_at))
    }
}

//! Database migrations

use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 2;

fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let sql = format!("PRAGMA table_info({table})");
    let Ok(mut stmt) = conn.prepare(&sql) else {
        return false;
    };
    let Ok(rows) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    rows.flatten().any(|name| name == column)
}

fn add_column_if_not_exists(
    conn: &Connection,
    table: &str,
    column: &str,
    col_type: &str,
) -> Result<(), rusqlite::Error> {
    if !column_exists(conn, table, column) {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column} {col_type}"), [])?;
    }
    Ok(())
}

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!("Database schema version: {} (target: {})", current_version, SCHEMA_VERSION);

    if current_version < 1 {
        tracing::info!("Running migration v1: planner schema");
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                text TEXT NOT NULL,
                due TEXT NOT NULL,
                level TEXT NOT NULL CHECK(level IN ('day', 'week', 'month')),
                done INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'plan',
                start_ts TEXT,
                end_ts TEXT,
                duration_minutes INTEGER,
                goal_id INTEGER,
                kr_id INTEGER,
                category_id INTEGER,
                history TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS objectives (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                title TEXT NOT NULL,
                due TEXT,
                due_history TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS key_results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                objective_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                quarter TEXT NOT NULL,
                progress INTEGER NOT NULL DEFAULT 0 CHECK(progress BETWEEN 0 AND 100),
                pinned INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS inbox (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                text TEXT NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0,
                history TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                title TEXT NOT NULL,
                objective_id INTEGER,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                goal_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                month INTEGER NOT NULL CHECK(month BETWEEN 1 AND 12),
                year INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS weeks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                stage_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                week_start TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                date TEXT NOT NULL,
                done INTEGER NOT NULL,
                total INTEGER NOT NULL,
                UNIQUE(owner, date)
            );

            CREATE TABLE IF NOT EXISTS settings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                UNIQUE(owner, key)
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_owner_due ON tasks(owner, due);
            CREATE INDEX IF NOT EXISTS idx_key_results_objective ON key_results(owner, objective_id);
            CREATE INDEX IF NOT EXISTS idx_inbox_owner ON inbox(owner);
            CREATE INDEX IF NOT EXISTS idx_stages_month ON stages(owner, year, month);
            CREATE INDEX IF NOT EXISTS idx_weeks_start ON weeks(owner, week_start);
            ",
        )?;
    }

    if current_version < 2 {
        tracing::info!("Running migration v2: known_chats table and category link on tasks");
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS known_chats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner INTEGER NOT NULL UNIQUE,
                chat_id INTEGER NOT NULL
            );
            ",
        )?;
        add_column_if_not_exists(conn, "tasks", "category_id", "INTEGER")?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tracing::info!("Database schema up to date (version {})", SCHEMA_VERSION);

    Ok(())
}

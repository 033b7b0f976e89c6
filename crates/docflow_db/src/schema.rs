use rust_embed::RustEmbed;
use sqlx::{Executor, PgPool};
use std::str;

use docflow_core::{Error, Result};

#[derive(RustEmbed)]
#[folder = "schema/"]
struct SchemaAssets;

/// Reads the build order and applies all SQL files in a single transaction.
pub async fn rebuild_database(pool: &PgPool) -> Result<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    let manifest = get_file_content("00_build_order.sql")
        .ok_or_else(|| Error::Database("missing 00_build_order.sql".to_string()))?;

    let mut full_script = String::new();
    for line in manifest.lines() {
        let trimmed = line.trim();

        // Parse: -- @include folder/file.sql
        if let Some(path) = parse_include_directive(trimmed) {
            let content = get_file_content(path)
                .ok_or_else(|| Error::Database(format!("missing included file: {path}")))?;
            full_script.push_str(&content);
            full_script.push('\n');
        } else if !trimmed.starts_with("--") {
            full_script.push_str(line);
            full_script.push('\n');
        }
    }

    tx.execute(full_script.as_str())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;
    tx.commit()
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

    Ok(())
}

fn get_file_content(path: &str) -> Option<String> {
    SchemaAssets::get(path).and_then(|f| str::from_utf8(f.data.as_ref()).ok().map(str::to_string))
}

fn parse_include_directive(line: &str) -> Option<&str> {
    if line.starts_with("--") && line.contains("@include") {
        line.split_whitespace().last()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::parse_include_directive;

    #[test]
    fn include_directives_parse() {
        assert_eq!(
            parse_include_directive("-- @include tables/users.sql"),
            Some("tables/users.sql")
        );
        assert_eq!(parse_include_directive("CREATE TABLE x ();"), None);
    }
}

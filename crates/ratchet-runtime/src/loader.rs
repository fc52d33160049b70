//! Loading migration steps from `.sql` files on disk.

use std::path::Path;

use ratchet_core::error::{RatchetError, Result};
use ratchet_core::{Migration, SemVersion};
use tracing::debug;

/// Load migrations from a directory.
///
/// Files are named `<version>_<name>.sql`, for example:
/// - `1.0.0_create_users.sql`
/// - `1.1_add_posts.sql`
///
/// The file stem becomes the migration id. A stem with no underscore is taken
/// to be a bare version. Results are sorted by version, then id. A missing
/// directory yields no migrations.
pub fn load_migrations_from_dir(dir: &Path) -> Result<Vec<Migration>> {
    if !dir.exists() {
        debug!("Migrations directory does not exist: {:?}", dir);
        return Ok(Vec::new());
    }

    let mut migrations = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if !path.is_file() || path.extension().map(|e| e != "sql").unwrap_or(true) {
            continue;
        }

        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RatchetError::Config(format!("Invalid migration filename: {:?}", path)))?
            .to_string();
        let version = version_from_id(&id)?;
        let sql = std::fs::read_to_string(&path)?;

        migrations.push(Migration::new(id, version, sql));
    }

    migrations.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.id.cmp(&b.id)));

    debug!("Loaded {} migrations from {:?}", migrations.len(), dir);
    Ok(migrations)
}

fn version_from_id(id: &str) -> Result<SemVersion> {
    let raw = id.split_once('_').map(|(v, _)| v).unwrap_or(id);
    SemVersion::parse(raw).map_err(|_| {
        RatchetError::Config(format!(
            "Migration file '{}' must start with a version, e.g. 1.2.0_add_posts.sql",
            id
        ))
    })
}

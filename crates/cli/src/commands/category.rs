//! Category management commands.
//!
//! # Seed file format
//!
//! ```yaml
//! categories:
//!   - Electronics
//!   - Home & Kitchen
//!   - Books
//! ```

use std::path::Path;

use serde::Deserialize;

use grabit_storefront::db::{CategoryRepository, RepositoryError};

use super::{CommandError, connect};

/// Contents of a category seed file.
#[derive(Debug, Deserialize)]
struct SeedFile {
    categories: Vec<String>,
}

/// Trim and length-check a category name.
fn validate_name(name: &str) -> Result<&str, CommandError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::Invalid("category name cannot be empty".to_owned()));
    }
    if name.chars().count() > CategoryRepository::MAX_NAME_LENGTH {
        return Err(CommandError::Invalid(format!(
            "category name must be at most {} characters: {name}",
            CategoryRepository::MAX_NAME_LENGTH
        )));
    }
    Ok(name)
}

/// Parse and validate a seed file before touching the database.
fn parse_seed(content: &str) -> Result<Vec<String>, CommandError> {
    let file: SeedFile = serde_yaml::from_str(content)?;
    file.categories
        .iter()
        .map(|name| validate_name(name).map(str::to_owned))
        .collect()
}

/// Add a category.
pub async fn add(name: &str) -> Result<(), CommandError> {
    let name = validate_name(name)?;
    let pool = connect().await?;

    let category = CategoryRepository::new(&pool).create(name).await?;
    tracing::info!("Category created: {} (ID {})", category.name, category.id);
    Ok(())
}

/// Print all categories, ordered by name.
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let categories = CategoryRepository::new(&pool).list().await?;

    #[allow(clippy::print_stdout)]
    for category in &categories {
        println!("{:>5}  {}", category.id, category.name);
    }
    tracing::info!("{} categories", categories.len());
    Ok(())
}

/// Remove a category by name.
pub async fn remove(name: &str) -> Result<(), CommandError> {
    let name = validate_name(name)?;
    let pool = connect().await?;

    CategoryRepository::new(&pool)
        .delete(name)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::Invalid(format!("no category named {name}")),
            other => other.into(),
        })?;

    tracing::info!("Category removed: {}", name);
    Ok(())
}

/// Create every category in a YAML seed file. Existing names are skipped.
pub async fn seed(file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_owned(),
            source,
        })?;
    let names = parse_seed(&content)?;
    tracing::info!(path = %file_path, count = names.len(), "Parsed seed file");

    let pool = connect().await?;
    let categories = CategoryRepository::new(&pool);

    let mut created = 0;
    for name in &names {
        match categories.create(name).await {
            Ok(_) => created += 1,
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!("Skipping existing category: {}", name);
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(created, skipped = names.len() - created, "Seeding complete");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("  Books ").unwrap(), "Books");
    }

    #[test]
    fn test_validate_name_rejects_blank_and_long() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"c".repeat(78)).is_err());
        assert!(validate_name(&"c".repeat(77)).is_ok());
    }

    #[test]
    fn test_parse_seed() {
        let names = parse_seed("categories:\n  - Electronics\n  - ' Books '\n").unwrap();
        assert_eq!(names, vec!["Electronics", "Books"]);
    }

    #[test]
    fn test_parse_seed_rejects_bad_files() {
        assert!(matches!(parse_seed("nope: []"), Err(CommandError::Yaml(_))));
        assert!(matches!(
            parse_seed("categories:\n  - ''\n"),
            Err(CommandError::Invalid(_))
        ));
    }
}

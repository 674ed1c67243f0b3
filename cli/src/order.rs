use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use mealflow_core::{
    open_url_with_warning, try_open_url, ApiClient, Clipboard, FileStore, Ingredient,
    KeyValueStore, MealflowConfig, OrderLinkAssembler, OrderSession, OrderState, Preferences,
    Recipe, Target,
};
use serde::Deserialize;

use crate::browser::{SystemBrowser, TerminalClipboard, TerminalNotifier};

/// Accepts a whole recipe or just its ingredient list.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecipeFile {
    Recipe(Recipe),
    Ingredients(Vec<Ingredient>),
}

pub fn load_ingredients(path: &Path) -> Result<Vec<Ingredient>> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed: RecipeFile = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a recipe or ingredient list", path.display()))?;

    let ingredients = match parsed {
        RecipeFile::Recipe(recipe) => {
            tracing::debug!(recipe = %recipe.id, title = %recipe.title, "loaded recipe");
            recipe.ingredients
        }
        RecipeFile::Ingredients(ingredients) => ingredients,
    };

    if ingredients.is_empty() {
        bail!("{} has no ingredients", path.display());
    }
    Ok(ingredients)
}

pub async fn order(
    config: &MealflowConfig,
    prefs: &Preferences<FileStore>,
    recipe: &Path,
    auto_open: bool,
    fallback: bool,
) -> Result<()> {
    let ingredients = load_ingredients(recipe)?;
    let client = ApiClient::from_config(config)?;
    let session = OrderSession::new(
        OrderLinkAssembler::from_config(client, config),
        Box::new(SystemBrowser),
        Box::new(TerminalClipboard),
    )
    .auto_open(auto_open)
    .fallback_to_current(fallback);

    let state = session.order(&ingredients).await?;
    finish_order(state, prefs, &mut io::stdout().lock())
}

/// Remember a ready link and print it. The link is printed even when the
/// opener reported success: the opener cannot tell whether a browser actually
/// showed it, so the terminal keeps a copy for the user.
fn finish_order<S: KeyValueStore>(
    state: OrderState,
    prefs: &Preferences<S>,
    out: &mut impl Write,
) -> Result<()> {
    match state {
        OrderState::LinkReady { link, notice } => {
            prefs.set_last_order_link(link.as_str());
            if let Some(notice) = notice {
                eprintln!("{}", notice);
                eprintln!("Use `mealflow open` or `mealflow copy` to try again.");
            }
            writeln!(out, "{}", link)?;
            Ok(())
        }
        OrderState::Failed { message } => Err(anyhow!(message)),
        other => Err(anyhow!("order ended in unexpected state {:?}", other)),
    }
}

fn last_link<S: KeyValueStore>(prefs: &Preferences<S>) -> Result<String> {
    prefs
        .last_order_link()
        .context("No order link yet; run `mealflow order` first")
}

pub fn open_last<S: KeyValueStore>(
    prefs: &Preferences<S>,
    fallback: bool,
    warn: bool,
) -> Result<()> {
    let link = last_link(prefs)?;

    if warn {
        open_url_with_warning(&SystemBrowser, &TerminalNotifier, &link, None);
        return Ok(());
    }

    try_open_url(&SystemBrowser, &link, &Target::Blank, fallback)
        .map_err(|blocked| anyhow!("{} ({})", blocked.user_message(), blocked))?;
    println!("{}", link);
    Ok(())
}

pub fn copy_last<S: KeyValueStore>(prefs: &Preferences<S>) -> Result<()> {
    let link = last_link(prefs)?;
    TerminalClipboard.write_text(&link)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealflow_core::error::NAVIGATION_BLOCKED_MESSAGE;
    use mealflow_core::MemoryStore;
    use tempfile::TempDir;

    #[test]
    fn test_load_recipe_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("borscht.json");
        fs::write(
            &path,
            r#"{
                "id": "r1",
                "title": "Борщ",
                "servings": 4,
                "ingredients": [
                    {"id": "1", "name": "Буряк", "amount": 2, "unit": "шт"},
                    {"id": "2", "name": "Сіль", "amount": 1, "unit": "ч.л.", "notes": "за смаком"}
                ]
            }"#,
        )
        .unwrap();

        let ingredients = load_ingredients(&path).unwrap();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[1].notes.as_deref(), Some("за смаком"));
    }

    #[test]
    fn test_load_bare_ingredient_list() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, r#"[{"id": "1", "name": "Milk", "amount": 1, "unit": "l"}]"#).unwrap();

        assert_eq!(load_ingredients(&path).unwrap()[0].name, "Milk");
    }

    #[test]
    fn test_empty_ingredient_list_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");
        fs::write(&path, "[]").unwrap();

        assert!(load_ingredients(&path).is_err());
    }

    fn ready(link: &str, notice: Option<&str>) -> OrderState {
        OrderState::LinkReady {
            link: serde_json::from_value(serde_json::json!(link)).unwrap(),
            notice: notice.map(str::to_string),
        }
    }

    #[test]
    fn test_opened_link_is_still_printed_and_remembered() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut out = Vec::new();
        let link = "https://store.example/order?ids=p1&titles=Milk";

        finish_order(ready(link, None), &prefs, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", link));
        assert_eq!(prefs.last_order_link().as_deref(), Some(link));
    }

    #[test]
    fn test_blocked_link_is_printed() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut out = Vec::new();
        let link = "https://store.example/order?ids=p1&titles=Milk";

        finish_order(
            ready(link, Some(NAVIGATION_BLOCKED_MESSAGE)),
            &prefs,
            &mut out,
        )
        .unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", link));
    }

    #[test]
    fn test_failed_order_prints_nothing() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut out = Vec::new();

        let err = finish_order(
            OrderState::Failed {
                message: "Не вдалося сформувати посилання для замовлення.".to_string(),
            },
            &prefs,
            &mut out,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Не вдалося сформувати посилання для замовлення."
        );
        assert!(out.is_empty());
        assert_eq!(prefs.last_order_link(), None);
    }

    #[test]
    fn test_copy_without_link_fails() {
        let prefs = Preferences::new(MemoryStore::new());
        assert!(copy_last(&prefs).is_err());

        prefs.set_last_order_link("https://store.example/order?ids=p1&titles=Milk");
        assert!(copy_last(&prefs).is_ok());
    }
}

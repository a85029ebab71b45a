//! Command-line front end: show, create and update blends, browse the blend
//! list and the bean catalog.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use crate::api_client::BlendApi;
use crate::config::AppConfig;
use crate::editor::RecipeEditor;
use crate::errors::RecipeError;
use crate::list_view::{self, ListCache, ListQuery, Page, SortField, Tab};
use crate::localization::t_args_lang;
use crate::notify::{format_total, MemoryNotifier, Notifier};
use crate::recipe_model::{ratio_to_percentage, BeanSummary, BlendRecord, BlendSummary, LineField};

#[derive(Parser, Debug)]
#[command(name = "roastery")]
#[command(about = "Roastery blend recipe editor")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a blend and its recipe
    Show {
        /// Blend id
        id: i64,
    },
    /// Create a new blend
    Create {
        /// Blend name
        #[arg(long)]
        name: String,
        /// Recipe line as BEAN_ID=PERCENT (repeatable)
        #[arg(long = "line", value_parser = parse_line_arg)]
        lines: Vec<(String, String)>,
    },
    /// Edit the recipe of an existing blend
    Update {
        /// Blend id
        id: i64,
        /// Set or add a line as BEAN_ID=PERCENT (repeatable)
        #[arg(long = "line", value_parser = parse_line_arg)]
        lines: Vec<(String, String)>,
        /// Remove the line for this bean id (repeatable)
        #[arg(long = "remove")]
        remove: Vec<String>,
        /// Rename the blend
        #[arg(long)]
        name: Option<String>,
    },
    /// Browse the blend list
    Blends(ListArgs),
    /// Browse the bean catalog
    Beans(ListArgs),
}

/// Search, filter and paging options shared by the list commands
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive search (beans also match origin and roast level)
    #[arg(long, default_value = "")]
    pub search: String,
    #[arg(long, value_enum, default_value_t = Tab::All)]
    pub tab: Tab,
    #[arg(long, value_enum, default_value_t = SortField::Id)]
    pub sort: SortField,
    /// Sort descending
    #[arg(long)]
    pub desc: bool,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Defaults to ROASTERY_PAGE_SIZE
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl ListArgs {
    fn query(&self, default_page_size: usize) -> ListQuery {
        ListQuery::default()
            .with_search(&self.search)
            .with_tab(self.tab)
            .with_sort(self.sort, self.desc)
            .with_page(self.page)
            .with_page_size(self.page_size.unwrap_or(default_page_size))
    }
}

/// Message keys used to print one kind of list
struct ListLabels {
    header: &'static str,
    empty: &'static str,
}

const BLEND_LABELS: ListLabels = ListLabels {
    header: "cli-blends-header",
    empty: "cli-blends-empty",
};

const BEAN_LABELS: ListLabels = ListLabels {
    header: "cli-beans-header",
    empty: "cli-beans-empty",
};

/// Parse a `BEAN_ID=PERCENT` argument into its two draft parts
pub fn parse_line_arg(raw: &str) -> Result<(String, String), String> {
    let (ingredient, percentage) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected BEAN_ID=PERCENT, got {raw:?}"))?;
    Ok((ingredient.trim().to_string(), percentage.trim().to_string()))
}

/// Shared state for one CLI invocation
pub struct Session<'a> {
    api: &'a dyn BlendApi,
    config: &'a AppConfig,
    blends: Arc<ListCache<BlendSummary>>,
    beans: Arc<ListCache<BeanSummary>>,
    notifier: Arc<MemoryNotifier>,
}

impl<'a> Session<'a> {
    pub fn new(api: &'a dyn BlendApi, config: &'a AppConfig) -> Self {
        Self {
            api,
            config,
            blends: Arc::new(ListCache::new()),
            beans: Arc::new(ListCache::new()),
            notifier: Arc::new(MemoryNotifier::new()),
        }
    }

    fn language(&self) -> &str {
        &self.config.language
    }

    async fn blend_list(&self) -> Result<Vec<BlendSummary>> {
        let api = self.api;
        self.blends
            .get_or_refresh(|| async move { api.list_blends().await })
            .await
            .context("Failed to load blend list")
    }

    async fn bean_catalog(&self) -> Result<Vec<BeanSummary>> {
        let api = self.api;
        self.beans
            .get_or_refresh(|| async move { api.list_beans().await })
            .await
            .context("Failed to load bean catalog")
    }

    fn editor(&self, record: Option<&BlendRecord>) -> RecipeEditor {
        let notifier: Arc<dyn Notifier> = self.notifier.clone();
        let editor = match record {
            Some(record) => RecipeEditor::from_record(record, notifier),
            None => RecipeEditor::new(notifier),
        };
        editor
            .with_language(self.language())
            .with_list_refresh(self.blends.clone())
    }

    fn flush_notices(&self, out: &mut dyn Write) -> Result<()> {
        for notice in self.notifier.drain() {
            writeln!(out, "{notice}")?;
        }
        Ok(())
    }

    /// Execute one command, writing user output to `out`
    pub async fn run(&self, command: Command, out: &mut dyn Write) -> Result<()> {
        debug!(?command, "Running command");
        match command {
            Command::Show { id } => self.show(id, out).await,
            Command::Create { name, lines } => self.create(name, lines, out).await,
            Command::Update {
                id,
                lines,
                remove,
                name,
            } => self.update(id, lines, remove, name, out).await,
            Command::Blends(args) => {
                let blends = self.blend_list().await?;
                let page = list_view::apply(&blends, &args.query(self.config.page_size));
                self.print_page(&page, &BLEND_LABELS, out)
            }
            Command::Beans(args) => {
                let beans = self.bean_catalog().await?;
                let page = list_view::apply(&beans, &args.query(self.config.page_size));
                self.print_page(&page, &BEAN_LABELS, out)
            }
        }
    }

    async fn show(&self, id: i64, out: &mut dyn Write) -> Result<()> {
        let record = self
            .api
            .get_blend(id)
            .await
            .with_context(|| format!("Failed to fetch blend {id}"))?;
        let names: HashMap<i64, String> = self
            .bean_catalog()
            .await?
            .into_iter()
            .map(|bean| (bean.id, bean.name))
            .collect();

        let name = record.name.clone().unwrap_or_else(|| format!("#{id}"));
        writeln!(out, "{}", t_args_lang("cli-blend-header", &[("name", name.as_str())], self.language()))?;
        for component in &record.recipe {
            let bean = names
                .get(&component.ingredient_ref)
                .cloned()
                .unwrap_or_else(|| format!("#{}", component.ingredient_ref));
            writeln!(out, "  {bean}: {}%", ratio_to_percentage(component.ratio))?;
        }

        let total = format_total(record.recipe.iter().map(|c| c.ratio * 100.0).sum());
        writeln!(out, "{}", t_args_lang("cli-blend-total", &[("total", total.as_str())], self.language()))?;
        Ok(())
    }

    async fn create(&self, name: String, lines: Vec<(String, String)>, out: &mut dyn Write) -> Result<()> {
        let mut editor = self.editor(None);
        editor.set_field("name", Value::String(name));

        for (i, (ingredient, percentage)) in lines.iter().enumerate() {
            let index = if i == 0 { 0 } else { editor.add_line()? };
            editor.update_line(index, LineField::Ingredient, ingredient)?;
            editor.update_line(index, LineField::Percentage, percentage)?;
        }

        self.save(&mut editor, out).await
    }

    async fn update(
        &self,
        id: i64,
        lines: Vec<(String, String)>,
        remove: Vec<String>,
        name: Option<String>,
        out: &mut dyn Write,
    ) -> Result<()> {
        let record = self
            .api
            .get_blend(id)
            .await
            .with_context(|| format!("Failed to fetch blend {id}"))?;
        let mut editor = self.editor(Some(&record));
        if let Some(name) = name {
            editor.set_field("name", Value::String(name));
        }

        for (ingredient, percentage) in &lines {
            let existing = editor
                .lines()
                .iter()
                .position(|line| line.ingredient_ref.trim() == ingredient.as_str());
            let index = match existing {
                Some(index) => index,
                None => editor.add_line()?,
            };
            editor.update_line(index, LineField::Ingredient, ingredient)?;
            editor.update_line(index, LineField::Percentage, percentage)?;
        }

        for ingredient in &remove {
            let position = editor
                .lines()
                .iter()
                .position(|line| line.ingredient_ref.trim() == ingredient.trim());
            if let Some(index) = position {
                match editor.remove_line(index) {
                    // the last line is kept; the editor already emitted a notice
                    Ok(_) | Err(RecipeError::MinimumLineGuard) => {}
                    Err(err) => return Err(err).context("Failed to remove recipe line"),
                }
            }
        }

        self.save(&mut editor, out).await
    }

    async fn save(&self, editor: &mut RecipeEditor, out: &mut dyn Write) -> Result<()> {
        let result = editor.submit(self.api).await;
        self.flush_notices(out)?;
        let receipt = result.context("Blend was not saved")?;
        let count = receipt.component_count.to_string();
        writeln!(
            out,
            "{}",
            t_args_lang("cli-blend-saved", &[("count", count.as_str())], self.language())
        )?;
        Ok(())
    }

    fn print_page<T: std::fmt::Display>(
        &self,
        page: &Page<T>,
        labels: &ListLabels,
        out: &mut dyn Write,
    ) -> Result<()> {
        if page.items.is_empty() {
            writeln!(out, "{}", t_args_lang(labels.empty, &[], self.language()))?;
            return Ok(());
        }

        let page_label = page.page.to_string();
        let pages_label = page.total_pages.to_string();
        let total_label = page.total_items.to_string();
        writeln!(
            out,
            "{}",
            t_args_lang(
                labels.header,
                &[
                    ("page", page_label.as_str()),
                    ("pages", pages_label.as_str()),
                    ("total", total_label.as_str()),
                ],
                self.language(),
            )
        )?;
        for item in &page.items {
            writeln!(out, "  {item}")?;
        }
        Ok(())
    }
}

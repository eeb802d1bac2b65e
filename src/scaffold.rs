use std::path::{Path, PathBuf};

use askama::Template;
use scraper::{Html, Selector};
use tokio::fs;
use tracing::{info, warn};

use crate::client::PuzzleSource;
use crate::config::{Layout, Level, RunContext, DAY_MODULE_FILE, PART_TWO_MARKER};
use crate::error::{Error, Result};
use crate::markdown::{EmphasisAsBold, Renderer};

#[derive(Template)]
#[template(path = "solver.rs.j2", escape = "none")]
struct SolverTemplate {
    level: Level,
}

#[derive(Template)]
#[template(path = "tests.rs.j2", escape = "none")]
struct TestsTemplate {
    level: Level,
    cases: Vec<Vec<String>>,
}

#[derive(Template)]
#[template(path = "day.rs.j2", escape = "none")]
struct DayTemplate {
    level: Level,
}

#[derive(Template)]
#[template(path = "index.rs.j2", escape = "none")]
struct IndexTemplate {
    days: Vec<IndexedDay>,
}

struct IndexedDay {
    level: u32,
    module: String,
}

/// What a scaffold pass changed on disk.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ScaffoldReport {
    pub created: Vec<PathBuf>,
    pub description_updated: bool,
    pub index_updated: bool,
}

/// The pieces of a puzzle page the scaffolder needs.
#[derive(Debug, PartialEq, Eq)]
pub struct Scraped {
    pub markdown: String,
    pub cases: Vec<String>,
}

pub struct Scaffolder<'a> {
    layout: &'a Layout,
    source: &'a dyn PuzzleSource,
    renderer: Renderer,
}

impl<'a> Scaffolder<'a> {
    pub fn new(layout: &'a Layout, source: &'a dyn PuzzleSource) -> Self {
        Self {
            layout,
            source,
            renderer: Renderer::new().with_rule(EmphasisAsBold),
        }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Creates whatever is missing for the level. Existing solver files, test
    /// modules and day modules are never touched; the description is refreshed
    /// until it contains part two.
    pub async fn scaffold(&self, ctx: &RunContext) -> Result<ScaffoldReport> {
        let level = ctx.level;
        let mut report = ScaffoldReport::default();

        let dir = self.layout.day_dir(level);
        fs::create_dir_all(&dir).await.map_err(Error::scaffold(&dir))?;

        let solver = SolverTemplate { level }.render()?;
        for path in self.layout.solver_files(level) {
            if create(&path, &solver).await? {
                report.created.push(path);
            }
        }

        let readme = self.layout.readme_file(level);
        let tests = self.layout.tests_file(level);
        let refresh_readme = !has_part_two(&readme).await?;
        let write_tests = !exists(&tests).await?;

        if refresh_readme || write_tests {
            let page = self.source.description(level, &ctx.session).await?;
            let scraped = scrape(&page, &self.renderer);

            if refresh_readme {
                write(&readme, &scraped.markdown).await?;
                report.description_updated = true;
                info!(path = %readme.display(), "description written");
            }

            if write_tests {
                let cases = scraped.cases.iter().map(|text| comment_lines(text)).collect();
                let module = TestsTemplate { level, cases }.render()?;
                write(&tests, &module).await?;
                report.created.push(tests);
            }
        }

        let module = self.layout.day_module_file(level);
        if create(&module, &DayTemplate { level }.render()?).await? {
            report.created.push(module);
        }

        let index = self.layout.solutions_index();
        if !report.created.is_empty() || !exists(&index).await? {
            self.write_index().await?;
            report.index_updated = true;
        }

        for path in &report.created {
            info!(path = %path.display(), "created");
        }
        Ok(report)
    }

    /// Rewrites `src/solutions/mod.rs` to register every scaffolded level.
    async fn write_index(&self) -> Result<()> {
        let dir = self.layout.solutions_dir();
        let mut days = Vec::new();
        let mut entries = fs::read_dir(&dir).await.map_err(Error::scaffold(&dir))?;
        while let Some(entry) = entries.next_entry().await.map_err(Error::scaffold(&dir))? {
            let name = entry.file_name();
            let Some(level) = name
                .to_str()
                .and_then(|name| name.strip_prefix("day_"))
                .and_then(|n| n.parse::<u32>().ok())
                .and_then(Level::new)
            else {
                continue;
            };
            if exists(&entry.path().join(DAY_MODULE_FILE)).await? {
                days.push(IndexedDay {
                    level: level.get(),
                    module: level.module_name(),
                });
            }
        }
        days.sort_by_key(|day| day.level);

        let index = self.layout.solutions_index();
        write(&index, &IndexTemplate { days }.render()?).await?;
        info!(path = %index.display(), "solutions index updated");
        Ok(())
    }
}

/// Extracts the description markdown and the text of every list item from
/// the puzzle's `article.day-desc` nodes.
pub fn scrape(page: &str, renderer: &Renderer) -> Scraped {
    let document = Html::parse_document(page);
    let article = Selector::parse("article.day-desc").expect("valid selector");
    let item = Selector::parse("li").expect("valid selector");

    let articles: Vec<_> = document.select(&article).collect();
    if articles.is_empty() {
        warn!("no puzzle description found on the page");
    }

    let cases = articles
        .iter()
        .flat_map(|article| article.select(&item))
        .map(|li| li.text().collect::<String>())
        .collect();

    Scraped {
        markdown: renderer.render_all(articles),
        cases,
    }
}

fn comment_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

async fn exists(path: &Path) -> Result<bool> {
    fs::try_exists(path).await.map_err(Error::scaffold(path))
}

async fn has_part_two(readme: &Path) -> Result<bool> {
    if !exists(readme).await? {
        return Ok(false);
    }
    let text = fs::read_to_string(readme)
        .await
        .map_err(Error::scaffold(readme))?;
    Ok(text.contains(PART_TWO_MARKER))
}

async fn write(path: &Path, contents: &str) -> Result<()> {
    let mut contents = contents.to_string();
    if !contents.ends_with('\n') {
        contents.push('\n');
    }
    fs::write(path, contents).await.map_err(Error::scaffold(path))
}

/// Writes `contents` unless the file exists. Returns whether it was written.
async fn create(path: &Path, contents: &str) -> Result<bool> {
    if exists(path).await? {
        return Ok(false);
    }
    write(path, contents).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::config::Session;
    use crate::input::tests::FakeSource;

    const PAGE: &str = r#"<html><body><main>
<article class="day-desc"><h2>--- Day 1: No Time for a Taxicab ---</h2>
<p>For example:</p>
<ul>
<li>Following <code>R2, L3</code> leaves you <em>5</em> blocks away.</li>
<li><code>R2, R2, R2</code> leaves you
<em>2</em> blocks away.</li>
</ul>
</article>
<p>Your puzzle answer was <code>42</code>.</p>
</main></body></html>"#;

    fn ctx() -> RunContext {
        RunContext::new(Level::new(1).unwrap(), Session::new("abc"))
    }

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn scrape_should_extract_article_and_items() {
        let scraped = scrape(PAGE, &Renderer::new().with_rule(EmphasisAsBold));

        assert_eq!(
            scraped.cases,
            vec![
                "Following R2, L3 leaves you 5 blocks away.".to_string(),
                "R2, R2, R2 leaves you\n2 blocks away.".to_string(),
            ]
        );
        assert!(scraped.markdown.starts_with("## --- Day 1: No Time for a Taxicab ---"));
        assert!(scraped.markdown.contains("leaves you **5** blocks away"));
        assert!(!scraped.markdown.contains("puzzle answer"));
    }

    #[test]
    fn page_without_article_should_scrape_empty() {
        let scraped = scrape("<p>nothing</p>", &Renderer::new());
        assert_eq!(scraped.markdown, "");
        assert!(scraped.cases.is_empty());
    }

    #[test]
    fn tests_template_should_emit_one_thunk_per_case() {
        let module = TestsTemplate {
            level: Level::new(1).unwrap(),
            cases: vec![
                vec!["first".into()],
                vec!["second a".into(), "second b".into()],
            ],
        }
        .render()
        .unwrap();

        assert_eq!(module.matches("thunk(|| async {").count(), 2);
        assert!(module.contains("            // second a\n            // second b\n"));
        assert!(module.contains("pub fn part_two() -> Vec<Thunk> {\n    vec![\n        // Add tests for part 2 here\n    ]"));
    }

    #[test]
    fn index_template_should_register_days() {
        let index = IndexTemplate {
            days: vec![IndexedDay {
                level: 7,
                module: "day_07".into(),
            }],
        }
        .render()
        .unwrap();

        assert!(index.contains("mod day_07;"));
        assert!(index.contains("registry.insert(7, day_07::entry());"));
    }

    #[tokio::test]
    async fn scaffold_should_create_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);

        let report = Scaffolder::new(&layout, &source).scaffold(&ctx()).await.unwrap();

        let level = ctx().level;
        let [part_1, part_2] = layout.solver_files(level);
        assert!(read(&part_1).contains("pub fn solve(input: &str)"));
        assert_eq!(read(&part_1), read(&part_2));
        assert!(read(&layout.readme_file(level)).contains("**5**"));
        assert!(read(&layout.tests_file(level)).contains("// R2, R2, R2 leaves you\n            // 2 blocks away."));
        assert!(read(&layout.solutions_index()).contains("registry.insert(1, day_01::entry());"));
        assert_eq!(report.created.len(), 4);
        assert!(report.description_updated);
        assert!(report.index_updated);
    }

    #[tokio::test]
    async fn scaffold_should_keep_existing_solvers() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);
        let level = ctx().level;
        let [part_1, part_2] = layout.solver_files(level);
        std::fs::create_dir_all(layout.day_dir(level)).unwrap();
        std::fs::write(&part_1, "// mine 1").unwrap();
        std::fs::write(&part_2, "// mine 2").unwrap();

        Scaffolder::new(&layout, &source).scaffold(&ctx()).await.unwrap();

        assert_eq!(read(&part_1), "// mine 1");
        assert_eq!(read(&part_2), "// mine 2");
    }

    #[tokio::test]
    async fn description_without_part_two_should_be_refreshed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);
        let level = ctx().level;
        std::fs::create_dir_all(layout.day_dir(level)).unwrap();
        std::fs::write(layout.readme_file(level), "stale").unwrap();

        let report = Scaffolder::new(&layout, &source).scaffold(&ctx()).await.unwrap();

        assert!(report.description_updated);
        assert!(read(&layout.readme_file(level)).contains("No Time for a Taxicab"));
    }

    #[tokio::test]
    async fn description_with_part_two_should_be_kept() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);
        let scaffolder = Scaffolder::new(&layout, &source);
        scaffolder.scaffold(&ctx()).await.unwrap();
        let level = ctx().level;
        std::fs::write(layout.readme_file(level), "## --- Part Two ---\nmine").unwrap();

        let report = scaffolder.scaffold(&ctx()).await.unwrap();

        assert_eq!(read(&layout.readme_file(level)), "## --- Part Two ---\nmine");
        assert!(!report.description_updated);
        assert_eq!(source.page_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn generated_tests_should_never_be_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);
        let scaffolder = Scaffolder::new(&layout, &source);
        scaffolder.scaffold(&ctx()).await.unwrap();
        let tests = layout.tests_file(ctx().level);
        std::fs::write(&tests, "// edited by hand").unwrap();

        let report = scaffolder.scaffold(&ctx()).await.unwrap();

        assert_eq!(read(&tests), "// edited by hand");
        assert!(report.created.is_empty());
        assert!(!report.index_updated);
    }

    #[tokio::test]
    async fn index_should_list_every_scaffolded_level() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);
        let scaffolder = Scaffolder::new(&layout, &source);

        for n in [12, 3] {
            let ctx = RunContext::new(Level::new(n).unwrap(), Session::new("abc"));
            scaffolder.scaffold(&ctx).await.unwrap();
        }

        let index = read(&layout.solutions_index());
        let three = index.find("mod day_03;").unwrap();
        let twelve = index.find("mod day_12;").unwrap();
        assert!(three < twelve);
        assert!(index.contains("registry.insert(12, day_12::entry());"));
    }

    #[tokio::test]
    async fn custom_renderer_should_shape_the_description() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::with_page(PAGE);

        Scaffolder::new(&layout, &source)
            .with_renderer(Renderer::new())
            .scaffold(&ctx())
            .await
            .unwrap();

        assert!(read(&layout.readme_file(ctx().level)).contains("leaves you _5_ blocks"));
    }

    #[tokio::test]
    async fn failed_page_fetch_should_abort() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let source = FakeSource::default();

        let err = Scaffolder::new(&layout, &source)
            .scaffold(&ctx())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Not Found");
        assert!(!layout.readme_file(ctx().level).exists());
    }
}

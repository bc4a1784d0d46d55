use std::sync::Arc;

use catalog_filter::database::Database;
use catalog_filter::external::{CachedQueryService, HttpQueryService};
use catalog_filter::models::{FilterMode, ListFilterModel};
use catalog_filter::services::list::MemoryLocation;
use catalog_filter::services::{
    FilterConfiguration, JsonPreferenceStore, ListCollaborators, ListController, ListControllerOptions,
    PersistenceLevel,
};

const USAGE: &str = "usage: catalog-filter <scenes|performers|studios|tags|movies|galleries|images> [query]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let mode: FilterMode = args
        .next()
        .ok_or_else(|| anyhow::anyhow!(USAGE))?
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}\n{}", e, USAGE))?;
    let query = args.next().unwrap_or_default();
    let query = query.trim_start_matches('?');

    let configuration = FilterConfiguration::from_env();
    let filter = ListFilterModel::from_query_string(mode, configuration.filter_defaults(mode), query);

    println!("query:   {}", filter.make_query_parameters());
    println!("json:    {}", filter.to_json()?);
    println!("request: {}", serde_json::to_string(&filter.make_request())?);
    for label in filter.criterion_labels(configuration.rating_system) {
        println!("  - {}", label);
    }

    let http = HttpQueryService::from_env();
    if !http.is_configured() {
        tracing::info!("CATALOG_API_URL 未设置，跳过查询");
        return Ok(());
    }

    let location = Arc::new(MemoryLocation::with_search(format!("/{}", mode), query));
    let mut collaborators = ListCollaborators::new(Arc::new(CachedQueryService::new(Arc::new(http))), location)
        .with_preference_store(Arc::new(JsonPreferenceStore::from_env().await?));

    let mut persistence = PersistenceLevel::View;
    if std::env::var("DATABASE_URL").is_ok() {
        let database = Database::new().await?;
        collaborators = collaborators.with_saved_filters(Arc::new(database.saved_filters().clone()));
        persistence = PersistenceLevel::All;
    }

    let options = ListControllerOptions::new(mode)
        .with_persistence(persistence)
        .with_configuration(configuration);
    let mut controller = ListController::new(options, collaborators);
    controller.mount().await;
    controller.refresh().await;

    if let Some(error) = controller.error() {
        anyhow::bail!("查询失败: {}", error);
    }
    if let Some(result) = controller.result() {
        println!(
            "count:   {} (page {}/{})",
            result.count,
            controller.filter().current_page(),
            controller.page_count().unwrap_or(0)
        );
        for id in result.item_ids() {
            println!("  {}", id);
        }
    }

    Ok(())
}

use anyhow::{bail, Context, Result};

use zdd::config::Config;
use zdd::db::{DatabaseProvider, PostgresDb};
use zdd::execute::Deployer;
use zdd::parser::load_deployments;
use zdd::plan::build_plan;
use zdd::schema_diff::render_schema_diff;
use zdd::script::ShellExecutor;

pub fn run(config: &Config, verbose: u8) -> Result<()> {
    let Some(url) = config.database_url.as_deref() else {
        bail!("a database URL is required to deploy (use --database-url or ZDD_DATABASE_URL)");
    };

    let root = config.absolute_deployments_path();

    let mut db = PostgresDb::connect(url).context("failed to connect to database")?;
    db.init_ledger()
        .context("failed to initialize deployment ledger")?;

    let local = load_deployments(&root).context("failed to load local deployments")?;
    let ledger = db
        .applied_deployments()
        .context("failed to fetch applied deployments")?;
    let plan = build_plan(local, &ledger);

    if plan.is_empty() {
        println!("No pending deployments to apply");
        return Ok(());
    }

    let before = db
        .dump_schema()
        .context("failed to dump schema before deploy")?;

    let executor = ShellExecutor::new(config.script_timeout());
    Deployer::new(&mut db, &executor, &root)
        .verbose(verbose > 0)
        .execute(&plan)?;

    let after = db
        .dump_schema()
        .context("failed to dump schema after deploy")?;

    match render_schema_diff(&before, &after) {
        Some(diff) => {
            println!("\nSchema changes:");
            print!("{diff}");
        }
        None => println!("\nNo schema changes detected"),
    }

    Ok(())
}

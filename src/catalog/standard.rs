//! Built-in catalog content.
//!
//! Failure modes are verb phrases completed by the tool name, e.g.
//! "log_analyzer" + "drops lines longer than 4 KB".

use super::{Domain, DomainCatalog, ToolCatalogEntry};

pub(super) const USECASE_MODIFIERS: &[&str] = &[
    "while implementing {}",
    "during {} rollout",
    "when {} fails unexpectedly",
    "while troubleshooting {}",
    "during {} optimization",
    "when scaling {}",
    "while integrating {}",
    "during {} migration",
];

pub(super) const USECASE_COMPLICATIONS: &[&str] = &[
    "The system is under heavy load",
    "Key team members are unavailable",
    "The deadline was moved up by 2 days",
    "Budget has been cut by 50%",
    "A competitor just launched similar features",
    "Regulatory requirements changed",
    "The primary vendor is having issues",
    "Critical data is corrupted",
    "Network connectivity is intermittent",
    "The client is extremely demanding",
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub(super) fn domains() -> Vec<DomainCatalog> {
    vec![technical(), business(), research(), creative()]
}

fn technical() -> DomainCatalog {
    let d = Domain::Technical;
    DomainCatalog {
        domain: d,
        tools: vec![
            ToolCatalogEntry::new(d, "code_executor", "Run and test code", &[
                "times out on the full test matrix",
                "runs an interpreter version older than the codebase expects",
                "silently truncates output after 10,000 lines",
            ]),
            ToolCatalogEntry::new(d, "log_analyzer", "Parse system logs", &[
                "drops lines longer than 4 KB",
                "misreads timestamps from the eu-west cluster",
                "only indexes the last 15 minutes of logs",
            ]),
            ToolCatalogEntry::new(d, "monitoring_dashboard", "Real-time metrics", &[
                "shows metrics delayed by ten minutes",
                "aggregates away the latency spikes that matter",
            ]),
            ToolCatalogEntry::new(d, "deployment_tool", "Deploy to environments", &[
                "requires a manual approval nobody is around to give",
                "rolls back automatically on a flaky health check",
                "deploys to staging even when production is targeted",
            ]),
            ToolCatalogEntry::new(d, "database_client", "Query and modify databases", &[
                "returns XML instead of the expected JSON",
                "holds table locks far longer than expected",
                "connects to a read replica lagging by hours",
            ]),
            ToolCatalogEntry::new(d, "test_runner", "Execute automated tests", &[
                "reports green while skipping half the suite",
                "fails intermittently on timing-sensitive tests",
            ]),
            ToolCatalogEntry::new(d, "profiler", "Analyze performance", &[
                "adds enough overhead to hide the real bottleneck",
                "cannot attach to processes in the container runtime",
            ]),
        ],
        simple_tasks: strings(&[
            "Run unit tests for the payment module",
            "Check server logs for errors in the last hour",
            "Deploy the staging branch to test environment",
            "Query database for user count",
            "Generate performance report for API endpoints",
        ]),
        complex_tasks: strings(&[
            "Deploy a critical hotfix to production during peak traffic",
            "Debug memory leak in distributed system under load",
            "Migrate database while maintaining zero downtime",
        ]),
    }
}

fn business() -> DomainCatalog {
    let d = Domain::Business;
    DomainCatalog {
        domain: d,
        tools: vec![
            ToolCatalogEntry::new(d, "data_analyzer", "Statistical analysis", &[
                "treats missing values as zeros",
                "caps input at 100,000 rows without warning",
            ]),
            ToolCatalogEntry::new(d, "presentation_builder", "Create slides", &[
                "breaks every chart when the template is updated",
                "exports fonts the boardroom machine does not have",
            ]),
            ToolCatalogEntry::new(d, "email_client", "Communications", &[
                "queues outgoing mail behind a stuck attachment",
                "strips the tracking links marketing relies on",
            ]),
            ToolCatalogEntry::new(d, "calendar_system", "Schedule management", &[
                "converts every invite to the organizer's time zone",
                "double-books the only available meeting room",
            ]),
            ToolCatalogEntry::new(d, "spreadsheet_tool", "Work with data", &[
                "recalculates formulas with stale exchange rates",
                "corrupts the merged cells in the summary tab",
                "locks the shared file while a colleague edits it",
            ]),
            ToolCatalogEntry::new(d, "report_generator", "Create reports", &[
                "pulls last quarter's numbers from a cached snapshot",
                "renders tables past the page margin",
            ]),
            ToolCatalogEntry::new(d, "crm_system", "Customer data", &[
                "has duplicate records for the biggest accounts",
                "rate-limits exports during business hours",
            ]),
        ],
        simple_tasks: strings(&[
            "Create a simple sales report for Q4",
            "Send meeting invite to team members",
            "Extract key metrics from spreadsheet",
            "Schedule follow-up with client",
            "Generate invoice from template",
        ]),
        complex_tasks: strings(&[
            "Prepare board presentation after key data source fails",
            "Handle PR crisis when product defect goes viral",
            "Coordinate product launch across multiple time zones",
        ]),
    }
}

fn research() -> DomainCatalog {
    let d = Domain::Research;
    DomainCatalog {
        domain: d,
        tools: vec![
            ToolCatalogEntry::new(d, "paper_database", "Search literature", &[
                "misses every preprint published this year",
                "returns retracted papers without flagging them",
            ]),
            ToolCatalogEntry::new(d, "statistical_package", "Run analyses", &[
                "uses a default test that assumes normality",
                "rounds p-values to two decimal places",
            ]),
            ToolCatalogEntry::new(d, "plotting_tool", "Create figures", &[
                "drops outliers from the axis range",
                "exports figures below the journal's required resolution",
            ]),
            ToolCatalogEntry::new(d, "latex_compiler", "Document preparation", &[
                "fails on a package the template depends on",
                "reorders floats so figures land pages away from their text",
            ]),
            ToolCatalogEntry::new(d, "citation_manager", "Handle references", &[
                "merges two different papers with the same title",
                "emits a citation style the venue rejects",
            ]),
            ToolCatalogEntry::new(d, "code_executor", "Run experiments", &[
                "uses a different random seed than the paper reported",
                "runs out of GPU memory on the full dataset",
            ]),
            ToolCatalogEntry::new(d, "data_repository", "Access datasets", &[
                "serves a dataset version that differs from the paper's",
                "requires access approval that takes days",
            ]),
        ],
        simple_tasks: strings(&[
            "Search for papers on neural networks",
            "Run statistical test on dataset",
            "Generate plot for experimental results",
            "Compile LaTeX document",
            "Check citations for formatting",
        ]),
        complex_tasks: strings(&[
            "Reproduce paper results with missing critical details",
            "Integrate conflicting datasets for meta-analysis",
            "Submit grant proposal with last-minute changes",
        ]),
    }
}

fn creative() -> DomainCatalog {
    let d = Domain::Creative;
    DomainCatalog {
        domain: d,
        tools: vec![
            ToolCatalogEntry::new(d, "design_tool", "Create graphics", &[
                "flattens every layer on export",
                "crashes on files with more than 200 artboards",
            ]),
            ToolCatalogEntry::new(d, "image_editor", "Edit images", &[
                "strips the color profile from every image",
                "upscales with visible artifacts",
            ]),
            ToolCatalogEntry::new(d, "grammar_checker", "Review text", &[
                "flags brand names as spelling errors",
                "rewrites the tagline into something bland",
            ]),
            ToolCatalogEntry::new(d, "asset_exporter", "Export files", &[
                "names files with characters the CMS rejects",
                "exports at 1x when the spec demands 2x",
            ]),
            ToolCatalogEntry::new(d, "color_tool", "Generate palettes", &[
                "produces palettes that fail contrast checks",
                "converts brand colors to the wrong color space",
            ]),
            ToolCatalogEntry::new(d, "video_editor", "Edit videos", &[
                "drops audio sync after the first cut",
                "cannot open the codec the footage was shot in",
            ]),
            ToolCatalogEntry::new(d, "render_engine", "Process media", &[
                "needs six hours for a render due in two",
                "renders with placeholder textures",
            ]),
        ],
        simple_tasks: strings(&[
            "Generate thumbnail for video",
            "Resize images for web",
            "Check content for grammar errors",
            "Export design assets",
            "Create simple color palette",
        ]),
        complex_tasks: strings(&[
            "Redesign UI after user testing reveals major issues",
            "Create marketing campaign with budget cut by 70%",
            "Produce video when key assets are corrupted",
        ]),
    }
}

//! Command handlers

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::cli::{Cli, Commands, OrderAction, OrderArgs, PlanAction, PriceAction, ShipAction};
use crate::output::{
    output_coverage, output_draft, output_order, output_orders, output_plan_cells, output_prices,
    output_report, output_search, output_shipment, output_shipments, output_stats,
};
use shukka_app::app;
use shukka_app::config::Config;
use shukka_app::export::export_daily_report;
use shukka_app::repository::open_database;
use shukka_domain::model::{MixDesign, NewShipment, OrderFields, OrderFlags, PlanFields};
use shukka_infra::persistence::FileDatabase;
use shukka_types::{Error, OutputFormat, Result, ShiftCategory};

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref data_dir) = cli.data_dir {
        config.data_dir = Some(data_dir.clone());
    }
    let output_format = cli.format.unwrap_or(config.output_format);
    debug!(
        format = %output_format,
        session_timeout_min = config.session_timeout().num_minutes(),
        "loaded configuration"
    );

    match cli.command {
        Commands::Config {
            show,
            set_data_dir,
            set_output,
            set_session_timeout,
            reset,
        } => cmd_config(show, set_data_dir, set_output, set_session_timeout, reset),

        Commands::Order { action } => {
            let db = open_database(&config)?;
            cmd_order(&db, action, output_format)
        }

        Commands::Plan { action } => {
            let db = open_database(&config)?;
            cmd_plan(&db, action, output_format)
        }

        Commands::Ship { action } => {
            let db = open_database(&config)?;
            cmd_ship(&db, action, output_format)
        }

        Commands::Report { date, xlsx } => {
            let db = open_database(&config)?;
            let report = app::daily_report(&db, date.unwrap_or_else(today))?;
            output_report(output_format, &report)?;
            if let Some(path) = xlsx {
                export_daily_report(&report, &path)?;
                eprintln!("Exported to {}", path.display());
            }
            Ok(())
        }

        Commands::Price { action } => {
            let db = open_database(&config)?;
            cmd_price(&db, action, output_format)
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn order_fields(args: OrderArgs) -> Result<OrderFields> {
    if let Some(path) = args.from_json {
        let content = std::fs::read_to_string(&path)?;
        return Ok(serde_json::from_str(&content)?);
    }

    Ok(OrderFields {
        site: args.site.unwrap_or_default(),
        site_address: args.address,
        customer: args.customer.unwrap_or_default(),
        contractor: args.contractor,
        coordinator: args.coordinator.filter(|c| !c.trim().is_empty()),
        contact: args.contact,
        product: args.product.unwrap_or_default(),
        product_category: args.product_category,
        note: args.note,
        first_ship_date: args.first_ship_date,
        quantity: args.quantity,
        rotation: args.rotation,
        price: args.price,
        mix: MixDesign::default(),
        flags: OrderFlags {
            site_test: args.site_test,
            night: args.night,
            outside_zone: args.outside_zone,
            material_delivery: args.material_delivery,
        },
        special_note: args.special_note,
    })
}

fn cmd_order(db: &FileDatabase, action: OrderAction, format: OutputFormat) -> Result<()> {
    match action {
        OrderAction::New { issue_no, fields } => {
            let order = app::create_order(db, issue_no.as_deref(), order_fields(fields)?, today())?;
            output_order(format, &order)
        }
        OrderAction::Edit { code, fields } => {
            let order = app::update_order(db, &code, order_fields(fields)?)?;
            output_order(format, &order)
        }
        OrderAction::Branch { code } => {
            let order = app::branch_order(db, &code, today())?;
            output_order(format, &order)
        }
        OrderAction::Show { code } => output_order(format, &app::get_order(db, &code)?),
        OrderAction::List { date } => {
            let orders = app::list_orders(db, date.unwrap_or_else(today))?;
            output_orders(format, &orders)
        }
        OrderAction::Search { term } => output_search(format, &app::search_orders(db, &term)?),
    }
}

fn cmd_plan(db: &FileDatabase, action: PlanAction, format: OutputFormat) -> Result<()> {
    match action {
        PlanAction::Set {
            date,
            section,
            row,
            contract,
            site,
            start,
            quantity,
            trucks,
            note,
        } => {
            let fields = PlanFields {
                contract_code: contract,
                site_name: site,
                start_time: start,
                plan_quantity: quantity,
                truck_count: trucks,
                note,
            };
            let cell = app::upsert_plan_cell(db, date, &section, row, &fields)?;
            output_plan_cells(format, std::slice::from_ref(&cell))
        }
        PlanAction::List { date } => {
            let cells = match date {
                Some(date) => app::list_plan_cells_for_date(db, date)?,
                None => app::list_plan_cells(db)?,
            };
            output_plan_cells(format, &cells)
        }
        PlanAction::Clear { date, section, row } => {
            if app::clear_plan_cell(db, date, &section, row)? {
                println!("Cleared {} {}-{}", date, section, row);
            } else {
                println!("Nothing to clear at {} {}-{}", date, section, row);
            }
            Ok(())
        }
        PlanAction::Check { code } => output_coverage(format, &app::plan_over_quantity(db, &code)?),
    }
}

fn cmd_ship(db: &FileDatabase, action: ShipAction, format: OutputFormat) -> Result<()> {
    match action {
        ShipAction::Prefill { code } => {
            let now = Local::now().naive_local();
            let draft = app::prefill_shipment(db, code.as_deref(), now)?;
            output_draft(format, &draft)
        }
        ShipAction::Record {
            code,
            vehicle,
            quantity,
            date,
            time,
        } => {
            let now = Local::now().naive_local();
            let input = NewShipment {
                contract_code: app::lookup_code(&code)?,
                date: date.unwrap_or(now.date()),
                time: time.unwrap_or(now.time()),
                quantity,
                vehicle_no: vehicle,
            };
            let event = app::record_shipment(db, &input)?;
            output_shipment(format, &event)
        }
        ShipAction::Stats { code, date } => {
            let stats = app::shipment_stats(db, &code, date.unwrap_or_else(today))?;
            output_stats(format, &stats)
        }
        ShipAction::List { code, date } => {
            let events = app::list_shipments(db, &code, date)?;
            output_shipments(format, &events)
        }
    }
}

fn cmd_price(db: &FileDatabase, action: PriceAction, format: OutputFormat) -> Result<()> {
    match action {
        PriceAction::Import { path } => cmd_price_import(db, &path),
        PriceAction::List => output_prices(format, &app::list_unit_prices(db)?),
        PriceAction::Set {
            category,
            item,
            price,
            standard,
        } => {
            let category: ShiftCategory = category.parse()?;
            let entry = app::upsert_unit_price(db, category, &item, price, standard)?;
            output_prices(format, std::slice::from_ref(&entry))
        }
    }
}

fn cmd_price_import(db: &FileDatabase, path: &Path) -> Result<()> {
    let count = app::import_unit_prices(db, path)?;
    println!("Imported {} unit prices from {}", count, path.display());
    Ok(())
}

fn cmd_config(
    show: bool,
    set_data_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_session_timeout: Option<u32>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(dir) = set_data_dir {
        config.data_dir = Some(dir);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(minutes) = set_session_timeout {
        if minutes == 0 {
            return Err(Error::validation(
                "session_timeout_minutes",
                "must be at least 1",
            ));
        }
        config.session_timeout_minutes = minutes;
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("\n{}", config);
    }

    Ok(())
}

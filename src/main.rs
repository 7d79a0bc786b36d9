use std::collections::BTreeSet;
use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use studyflow::api::ApiClient;
use studyflow::models::{AssignmentDraft, Category, DashboardFilters, DashboardSnapshot};
use studyflow::services::calendar::CalendarView;
use studyflow::services::triggers::start_refresh_triggers;
use studyflow::utils::{badge, config, dates};
use studyflow::{DashboardSynchronizer, Session, SessionStore, SyncPhase};

type Engine = DashboardSynchronizer<ApiClient>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cfg = config::ClientConfig::from_env();
    let gateway = Arc::new(ApiClient::new(&cfg).context("building HTTP client")?);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let user_name = match resolve_user_name(&mut input).await? {
        Some(name) => name,
        None => return Ok(()),
    };

    let store = SessionStore::new(&cfg.data_dir);
    let session = Session::login(gateway.as_ref(), store, &user_name)
        .await
        .context("login failed")?;
    let sync = Arc::new(Engine::new(gateway, Arc::new(session)));

    match sync.restore().await {
        Ok(true) => render_dashboard(&sync).await,
        Ok(false) => println!("no semester yet; create one with `newsem <name>`"),
        Err(e) => println!("could not restore last semester: {e}"),
    }

    let (trigger_source, trigger_handle) =
        start_refresh_triggers(sync.clone(), cfg.refresh_interval_secs);

    // Loading indicator for background refreshes.
    let mut phase_rx = sync.subscribe_phase();
    let phase_task = tokio::spawn(async move {
        while phase_rx.changed().await.is_ok() {
            if matches!(*phase_rx.borrow(), SyncPhase::Loading) {
                println!("loading...");
            }
        }
    });

    prompt();
    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt();
            continue;
        }
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match command {
            "quit" | "exit" => break,
            "logout" => {
                sync.logout().await;
                println!("logged out");
                break;
            }
            "help" => print_help(),
            other => {
                if let Err(e) = dispatch(&sync, other, &args).await {
                    println!("error: {e}");
                }
            }
        }
        prompt();
    }

    // Focus/visibility/online feeds and the timer go away together.
    drop(trigger_source);
    trigger_handle.shutdown();
    phase_task.abort();
    Ok(())
}

async fn resolve_user_name(input: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<Option<String>> {
    if let Some(name) = std::env::args().nth(1) {
        return Ok(Some(name));
    }
    if let Ok(name) = std::env::var("STUDYFLOW_USER") {
        if !name.trim().is_empty() {
            return Ok(Some(name.trim().to_string()));
        }
    }
    print!("user name: ");
    let _ = std::io::stdout().flush();
    let name = input.next_line().await?;
    Ok(name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty()))
}

async fn dispatch(sync: &Arc<Engine>, command: &str, args: &[&str]) -> Result<(), String> {
    match command {
        "sem" => {
            let sem_id = parse_id(args.first())?;
            sync.select_semester(sem_id).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "semesters" => render_semesters(&sync.snapshot().await),
        "subjects" => render_subjects(&sync.snapshot().await),
        "addsub" => {
            let name = rest(args, 0, "usage: addsub <name>")?;
            sync.create_subject(&name).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "rmsub" => {
            let sub_id = parse_id(args.first())?;
            sync.delete_subject(sub_id).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "add" => {
            // add <subId> <YYYY-MM-DD> <category> <name...>
            if args.len() < 4 {
                return Err("usage: add <subId> <YYYY-MM-DD> <category> <name>".to_string());
            }
            let draft = AssignmentDraft {
                assign_id: None,
                sub_id: Some(parse_id(args.first())?),
                due_date: args[1].to_string(),
                category: args[2].parse()?,
                assign_name: args[3..].join(" "),
            };
            sync.save_assignment(&draft).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "edit" => {
            // edit <assignId> <YYYY-MM-DD> <category> <name...>
            if args.len() < 4 {
                return Err("usage: edit <assignId> <YYYY-MM-DD> <category> <name>".to_string());
            }
            let assign_id = parse_id(args.first())?;
            // keep the row's subject linkage as-is, present or not
            let existing_sub = sync
                .snapshot()
                .await
                .and_then(|snap| snap.find_assignment(assign_id).map(|a| a.sub_id))
                .ok_or_else(|| format!("unknown assignment id: {assign_id}"))?;
            let draft = AssignmentDraft {
                assign_id: Some(assign_id),
                sub_id: existing_sub,
                due_date: args[1].to_string(),
                category: args[2].parse()?,
                assign_name: args[3..].join(" "),
            };
            sync.save_assignment(&draft).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "rm" => {
            let assign_id = parse_id(args.first())?;
            sync.delete_assignment(assign_id).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "done" => {
            let assign_id = parse_id(args.first())?;
            let currently = sync
                .snapshot()
                .await
                .and_then(|snap| snap.find_assignment(assign_id).map(|a| a.is_complete))
                .ok_or_else(|| format!("unknown assignment id: {assign_id}"))?;
            sync.toggle_complete(assign_id, !currently)
                .await
                .map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "filter" => {
            apply_filter(sync, args).await?;
            render_dashboard(sync).await;
        }
        "cal" => {
            let reference = match args.first() {
                Some(month) => parse_month(month)?,
                None => dates::today(),
            };
            let view = sync.calendar_view(reference).await;
            render_calendar(reference, &view);
        }
        "refresh" => {
            sync.refresh().await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "newsem" => {
            let name = rest(args, 0, "usage: newsem <name>")?;
            sync.create_semester(&name).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        "rmsem" => {
            let sem_id = parse_id(args.first())?;
            sync.delete_semester(sem_id).await.map_err(stringify)?;
            render_dashboard(sync).await;
        }
        other => return Err(format!("unknown command: {other} (try `help`)")),
    }
    Ok(())
}

async fn apply_filter(sync: &Arc<Engine>, args: &[&str]) -> Result<(), String> {
    match args {
        ["sub", "all"] => sync.set_subject_filter(None).await.map_err(stringify),
        ["sub", id] => {
            let sub_id = id.parse().map_err(|_| format!("not a subject id: {id}"))?;
            sync.set_subject_filter(Some(sub_id)).await.map_err(stringify)
        }
        ["cat", "all"] => sync
            .set_category_filter(BTreeSet::new())
            .await
            .map_err(stringify),
        ["cat", csv] => {
            let mut categories = BTreeSet::new();
            for part in csv.split(',') {
                categories.insert(part.parse::<Category>()?);
            }
            sync.set_category_filter(categories).await.map_err(stringify)
        }
        _ => Err("usage: filter sub <id>|all, filter cat <csv>|all".to_string()),
    }
}

async fn render_dashboard(sync: &Arc<Engine>) {
    let Some(snapshot) = sync.snapshot().await else {
        match sync.phase() {
            SyncPhase::Error(message) => println!("dashboard unavailable: {message}"),
            _ => println!("no dashboard loaded"),
        }
        return;
    };
    let filters = sync.filters().await;
    print_snapshot(&snapshot, &filters);
    if let SyncPhase::Error(message) = sync.phase() {
        println!("(showing last good data; refresh failed: {message})");
    }
}

fn print_snapshot(snapshot: &DashboardSnapshot, filters: &DashboardFilters) {
    println!();
    println!(
        "semester {} [{}]   user {}",
        snapshot.sem_name, snapshot.sem_id, snapshot.user_name
    );

    let subject_part = match filters.subject {
        Some(id) => format!("subject={id}"),
        None => "subject=all".to_string(),
    };
    let category_part = if filters.categories.is_empty() {
        "categories=all".to_string()
    } else {
        let names: Vec<&str> = filters.categories.iter().map(|c| c.label()).collect();
        format!("categories={}", names.join(","))
    };
    println!("filters: {subject_part} {category_part}");

    println!("open ({}):", snapshot.incomplete.len());
    for assignment in &snapshot.incomplete {
        print_row(assignment);
    }
    println!("done ({}):", snapshot.complete.len());
    for assignment in &snapshot.complete {
        print_row(assignment);
    }
}

fn print_row(assignment: &studyflow::models::Assignment) {
    let badge = badge::classify(
        &assignment.due_date,
        assignment.is_complete,
        assignment.due_label.as_deref(),
    );
    let urgency = if badge.is_overdue {
        " !!"
    } else if badge.is_urgent {
        " !"
    } else {
        ""
    };
    println!(
        "  [{:>4}] {:<6} {:<10} {:<32} {:<12} {}{}",
        assignment.assign_id,
        badge.label,
        assignment.due_date,
        assignment.assign_name,
        assignment.category,
        assignment.sub_name.as_deref().unwrap_or("(subject#?)"),
        urgency,
    );
}

fn render_semesters(snapshot: &Option<DashboardSnapshot>) {
    let Some(snapshot) = snapshot else {
        println!("no dashboard loaded");
        return;
    };
    for item in &snapshot.semesters {
        let marker = if item.current { "*" } else { " " };
        println!("{} [{:>4}] {}", marker, item.sem_id, item.sem_name);
    }
}

fn render_subjects(snapshot: &Option<DashboardSnapshot>) {
    let Some(snapshot) = snapshot else {
        println!("no dashboard loaded");
        return;
    };
    if snapshot.subjects.is_empty() {
        println!("no subjects; add one with `addsub <name>`");
        return;
    }
    for subject in &snapshot.subjects {
        println!("[{:>4}] {}", subject.sub_id, subject.sub_name);
    }
}

fn render_calendar(reference: NaiveDate, view: &CalendarView) {
    println!();
    println!("{}", reference.format("%B %Y"));
    println!("  Su  Mo  Tu  We  Th  Fr  Sa");
    for week in view.grid.chunks(7) {
        let mut row = String::new();
        for day in week {
            let mark = if !view.on(day.date).is_empty() {
                '*'
            } else if day.in_month {
                ' '
            } else {
                '.'
            };
            row.push_str(&format!(" {:>2}{}", day.date.day(), mark));
        }
        println!("{row}");
    }
    for day in view.grid.iter().filter(|d| d.in_month) {
        for entry in view.on(day.date) {
            let state = if entry.is_complete { "done" } else { "open" };
            println!(
                "  {}  {} ({}, {}, {})",
                dates::day_string(day.date),
                entry.name,
                entry.subject_name,
                entry.category,
                state,
            );
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  semesters             list semesters");
    println!("  sem <id>              switch semester");
    println!("  newsem <name>         create semester");
    println!("  rmsem <id>            delete semester");
    println!("  subjects              list subjects");
    println!("  addsub <name>         create subject");
    println!("  rmsub <id>            delete subject");
    println!("  add <subId> <date> <category> <name>");
    println!("  edit <assignId> <date> <category> <name>");
    println!("  rm <assignId>         delete assignment");
    println!("  done <assignId>       toggle completion");
    println!("  filter sub <id>|all   narrow by subject");
    println!("  filter cat <csv>|all  narrow by category (0=assignment,1=lecture,2=todo)");
    println!("  cal [YYYY-MM]         month calendar");
    println!("  refresh               re-fetch now");
    println!("  logout                clear session and exit");
    println!("  quit                  exit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn parse_id(arg: Option<&&str>) -> Result<i64, String> {
    let raw = arg.ok_or_else(|| "missing id".to_string())?;
    raw.parse().map_err(|_| format!("not an id: {raw}"))
}

fn rest(args: &[&str], from: usize, usage: &str) -> Result<String, String> {
    let joined = args.get(from..).unwrap_or_default().join(" ");
    if joined.trim().is_empty() {
        return Err(usage.to_string());
    }
    Ok(joined.trim().to_string())
}

fn parse_month(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d")
        .map_err(|_| format!("not a month (want YYYY-MM): {input}"))
}

fn stringify(e: studyflow::SyncError) -> String {
    e.to_string()
}

// Course Planner
// Command-line entry point

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use course_planner::models::course::{CourseDraft, CourseFields, CourseGroup, GroupId};
use course_planner::models::course_type::CourseType;
use course_planner::models::settings::Settings;
use course_planner::models::slot::Day;
use course_planner::services::course::CourseService;
use course_planner::services::course_type::CourseTypeService;
use course_planner::services::database::Database;
use course_planner::services::planner::SchedulePlanner;
use course_planner::services::pool::ToggleOutcome;
use course_planner::services::projector::{GridCell, ScheduleGrid, ScheduleView};
use course_planner::services::settings::SettingsService;
use course_planner::{ScheduleError, ScheduleResult};

const CELL_WIDTH: usize = 14;

type Planner<'a> = SchedulePlanner<CourseService<'a>>;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn course_args(command: Command, required: bool) -> Command {
    command
        .arg(
            Arg::new("name")
                .long("name")
                .required(required)
                .help("Course name"),
        )
        .arg(
            Arg::new("day")
                .long("day")
                .required(required)
                .value_parser(|s: &str| s.parse::<Day>())
                .help("Monday-Friday, Mon-Fri or 1-5"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .required(required)
                .value_parser(value_parser!(u8))
                .help("First period"),
        )
        .arg(
            Arg::new("end")
                .long("end")
                .value_parser(value_parser!(u8))
                .help("Last period (defaults to the first)"),
        )
        .args(style_args())
}

fn style_args() -> [Arg; 3] {
    [
        Arg::new("type").long("type").help("Course type"),
        Arg::new("color").long("color").help("Hex color, e.g. #a5b4fc"),
        Arg::new("description")
            .long("description")
            .help("Free-text description"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Course id")
}

fn cli() -> Command {
    Command::new("course-planner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Weekly course schedule planner")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(course_args(Command::new("add").about("Add a course over a period range"), true))
        .subcommand(
            Command::new("add-encoded")
                .about("Add a course from an encoded time such as 313 (Wednesday periods 1 and 3)")
                .arg(Arg::new("name").long("name").required(true).help("Course name"))
                .arg(
                    Arg::new("time")
                        .long("time")
                        .required(true)
                        .help("Day digit followed by period digits"),
                )
                .args(style_args()),
        )
        .subcommand(course_args(
            Command::new("update")
                .about("Change a course; omitted options keep their value")
                .arg(id_arg()),
            false,
        ))
        .subcommand(Command::new("list").about("List all courses"))
        .subcommand(
            Command::new("select")
                .about("Select a course, asking before replacing overlapping courses")
                .arg(id_arg())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Replace overlapping courses without asking"),
                ),
        )
        .subcommand(Command::new("deselect").about("Deselect a course").arg(id_arg()))
        .subcommand(Command::new("delete").about("Delete a course").arg(id_arg()))
        .subcommand(
            Command::new("show").about("Show the weekly schedule").arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Output as JSON"),
            ),
        )
        .subcommand(Command::new("types").about("List course types"))
        .subcommand(
            Command::new("add-type")
                .about("Add a course type")
                .arg(Arg::new("name").long("name").required(true).help("Type name"))
                .arg(Arg::new("color").long("color").required(true).help("Hex color")),
        )
        .subcommand(Command::new("config").about("Show the configuration in use"))
}

fn init_logging(settings: &Settings) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.log_level.as_str()),
    )
    .init();
}

fn run() -> Result<()> {
    let matches = cli().get_matches();

    let settings_service = SettingsService::from_environment();
    let settings = settings_service.load()?;
    init_logging(&settings);

    let (command, args) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("No command given"))?;

    if command == "config" {
        println!("# {}", settings_service.path().display());
        println!("# database: {}", SettingsService::database_path(&settings).display());
        print!("{}", toml::to_string_pretty(&settings).context("Failed to serialize settings")?);
        return Ok(());
    }

    let db_path = SettingsService::database_path(&settings);
    log::info!("Opening database {}", db_path.display());
    let db = Database::new(&db_path.to_string_lossy())?;
    db.initialize_schema()?;
    let types = CourseTypeService::new(db.connection());

    let mut planner = SchedulePlanner::new(CourseService::new(db.connection()), settings.periods_per_day);
    planner.load()?;

    match command {
        "add" => {
            let draft = draft_from_args(args, None, &settings, &types)?;
            if let Some(group) = report(planner.add_course(&draft))? {
                println!("Added {} ({} {})", group.id, group.day, group.periods_label());
            }
        }
        "add-encoded" => {
            let (course_type, color) = style_from_args(args, &settings, &types)?;
            let fields = CourseFields {
                name: required(args, "name")?,
                time: required(args, "time")?,
                description: args.get_one::<String>("description").cloned(),
                course_type,
                color,
            };
            if let Some(group) = report(planner.add_encoded(&fields))? {
                println!("Added {} ({} {})", group.id, group.day, group.periods_label());
            }
        }
        "update" => {
            let id = id_from_args(args)?;
            let Some(current) = planner.pool().get(&id).cloned() else {
                eprintln!("warning: {}", ScheduleError::NotFound(id));
                return Ok(());
            };
            let draft = draft_from_args(args, Some(&current), &settings, &types)?;
            if let Some(group) = report(planner.update_course(&id, &draft))? {
                let state = if group.selected { "selected" } else { "not selected" };
                println!("Updated {} ({} {}, {})", group.id, group.day, group.periods_label(), state);
            }
        }
        "list" => print_list(&planner.view()),
        "select" => select(&mut planner, &id_from_args(args)?, args.get_flag("force"))?,
        "deselect" => {
            if report(planner.toggle_selection(&id_from_args(args)?, false))?.is_some() {
                println!("Deselected");
            }
        }
        "delete" => {
            if let Some(group) = report(planner.delete_course(&id_from_args(args)?))? {
                println!("Deleted '{}'", group.name);
            }
        }
        "show" => {
            let view = planner.view();
            if args.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render_grid(&view.grid));
            }
        }
        "types" => {
            for course_type in types.list_all()? {
                let marker = if course_type.is_system { " (built-in)" } else { "" };
                let usage = types.usage_count(&course_type.name)?;
                println!("{:<20} {}  {} course(s){}", course_type.name, course_type.color, usage, marker);
            }
        }
        "add-type" => {
            let created = types.create(CourseType::new(
                required(args, "name")?,
                required(args, "color")?,
            ))?;
            println!("Added type '{}'", created.name);
        }
        other => bail!("Unknown command '{}'", other),
    }

    Ok(())
}

/// Warnings go to stderr and are not failures; every other error is.
fn report<T>(result: ScheduleResult<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_warning() => {
            eprintln!("warning: {}", err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn select(planner: &mut Planner<'_>, id: &GroupId, force: bool) -> Result<()> {
    let pending = match report(planner.toggle_selection(id, true))? {
        None => return Ok(()),
        Some(ToggleOutcome::Conflict(pending)) => pending,
        Some(_) => {
            println!("Selected");
            return Ok(());
        }
    };

    println!("{}", pending.message);
    if force || confirm("Replace? [y/N] ")? {
        let plan = planner.confirm_override(id)?;
        println!("Selected, replacing {} course(s)", plan.deselect.len());
    } else {
        planner.cancel_override();
        println!("Cancelled");
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn required(args: &ArgMatches, name: &str) -> Result<String> {
    args.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn id_from_args(args: &ArgMatches) -> Result<GroupId> {
    required(args, "id").map(GroupId::from)
}

/// Type and color from the options, falling back to the configured defaults.
/// Unknown types are rejected; known ones are stored under their canonical name.
fn style_from_args(
    args: &ArgMatches,
    settings: &Settings,
    types: &CourseTypeService<'_>,
) -> Result<(String, String)> {
    let requested = args
        .get_one::<String>("type")
        .cloned()
        .unwrap_or_else(|| settings.default_type.clone());
    let course_type = types
        .get_by_name(&requested)?
        .ok_or_else(|| anyhow!("Unknown course type '{}' (see `types`)", requested))?;
    let color = args
        .get_one::<String>("color")
        .cloned()
        .unwrap_or_else(|| settings.default_color.clone());
    Ok((course_type.name, color))
}

fn draft_from_args(
    args: &ArgMatches,
    current: Option<&CourseGroup>,
    settings: &Settings,
    types: &CourseTypeService<'_>,
) -> Result<CourseDraft> {
    let start = args.get_one::<u8>("start").copied();
    let end = args.get_one::<u8>("end").copied();

    let Some(current) = current else {
        let start = start.ok_or_else(|| anyhow!("--start is required"))?;
        let day = *args
            .get_one::<Day>("day")
            .ok_or_else(|| anyhow!("--day is required"))?;
        let (course_type, color) = style_from_args(args, settings, types)?;
        let mut draft = CourseDraft::new(required(args, "name")?, day, start, end.unwrap_or(start))
            .with_type(course_type)
            .with_color(color);
        draft.description = args.get_one::<String>("description").cloned();
        return Ok(draft);
    };

    if start.is_none() && end.is_none() && current.periods_label().contains(',') {
        bail!(
            "'{}' meets in separate periods ({}); pass --start and --end to replace them",
            current.name,
            current.periods_label()
        );
    }
    let first = current.first_period().unwrap_or(1);
    let last = current.periods.iter().next_back().copied().unwrap_or(first);
    let end = end.unwrap_or(match start {
        Some(start) => start,
        None => last,
    });
    let start = start.unwrap_or(first);

    let course_type = match args.get_one::<String>("type") {
        Some(requested) => types
            .get_by_name(requested)?
            .map(|t| t.name)
            .ok_or_else(|| anyhow!("Unknown course type '{}' (see `types`)", requested))?,
        None => current.course_type.clone(),
    };

    let mut draft = CourseDraft::new(
        args.get_one::<String>("name").cloned().unwrap_or_else(|| current.name.clone()),
        args.get_one::<Day>("day").copied().unwrap_or(current.day),
        start,
        end,
    )
    .with_type(course_type)
    .with_color(
        args.get_one::<String>("color")
            .cloned()
            .unwrap_or_else(|| current.color.clone()),
    );
    draft.description = args
        .get_one::<String>("description")
        .cloned()
        .or_else(|| current.description.clone());
    Ok(draft)
}

fn print_list(view: &ScheduleView) {
    if view.groups.is_empty() {
        println!("No courses yet. Add one with `course-planner add`.");
        return;
    }
    for group in &view.groups {
        let mark = if group.selected { "x" } else { " " };
        println!(
            "[{}] {}  {:<9} {:<6} {} ({})",
            mark,
            group.id,
            group.day.name(),
            group.periods_label,
            group.name,
            group.course_type
        );
    }
}

fn fit(text: &str) -> String {
    let mut cell: String = text.chars().take(CELL_WIDTH).collect();
    let len = cell.chars().count();
    cell.extend(std::iter::repeat(' ').take(CELL_WIDTH - len));
    cell
}

/// Plain-text grid: anchors show the course name, covered cells a continuation mark.
fn render_grid(grid: &ScheduleGrid) -> String {
    let mut out = String::from("    ");
    for day in &grid.days {
        out.push_str("| ");
        out.push_str(&fit(day.name()));
    }
    out.push('\n');

    for (index, row) in grid.rows.iter().enumerate() {
        out.push_str(&format!("{:>3} ", index + 1));
        for cell in row {
            out.push_str("| ");
            let text = match cell {
                GridCell::Empty => String::new(),
                GridCell::Anchor { name, span, .. } if *span > 1 => format!("{} ({})", name, span),
                GridCell::Anchor { name, .. } => name.clone(),
                GridCell::Covered { .. } => "  \"".to_string(),
            };
            out.push_str(&fit(&text));
        }
        out.push('\n');
    }
    out
}

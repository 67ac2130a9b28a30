use chrono::Local;
use clap::{Parser, Subcommand};
use sekai_core::quiz::option_label;
use sekai_core::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sekai")]
#[command(about = "Self-paced curriculum and learner progress", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory (learner progress)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override content directory (chapter and project files)
    #[arg(long, global = true)]
    content_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show level, activity and the chapter map (default)
    Status,

    /// List projects by completed, unlocked and locked
    Projects,

    /// Take the quiz for a module
    Quiz {
        /// Module number
        module: u32,

        /// Scripted answers (option letters or option text), comma separated
        #[arg(long, value_delimiter = ',')]
        answers: Option<Vec<String>>,
    },

    /// Mark a project as completed
    CompleteProject {
        /// Project ID
        id: String,
    },

    /// Check the curriculum files for problems
    Validate,
}

struct Paths {
    progress: PathBuf,
    content: PathBuf,
}

fn main() -> Result<()> {
    sekai_core::logging::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    let content = match (cli.content_dir, &cli.data_dir) {
        (Some(dir), _) => dir,
        (None, Some(data_dir)) => config
            .content
            .content_dir
            .clone()
            .unwrap_or_else(|| data_dir.join("content")),
        (None, None) => config.content_dir(),
    };
    let paths = Paths {
        progress: Config::progress_path(&data_dir),
        content,
    };

    // Opening the app counts as activity for today
    let progress = LearnerProgress::update(&paths.progress, config.progress.starting_level, |p| {
        p.register_activity(&Local::now());
        Ok(())
    })?;

    if let Some(Commands::Validate) = cli.command {
        return cmd_validate(&paths.content);
    }

    let (catalog, diagnostics) = load_catalog_dir(&paths.content)?;
    for diagnostic in &diagnostics {
        eprintln!("warning: skipped {}", diagnostic);
    }

    match cli.command {
        Some(Commands::Projects) => cmd_projects(&catalog, &progress),
        Some(Commands::Quiz { module, answers }) => {
            cmd_quiz(&catalog, &progress, &paths, &config, module, answers)
        }
        Some(Commands::CompleteProject { id }) => {
            cmd_complete_project(&catalog, &paths, &config, &id)
        }
        Some(Commands::Status) | Some(Commands::Validate) | None => {
            cmd_status(&catalog, &progress, &config)
        }
    }
}

fn cmd_status(catalog: &Catalog, progress: &LearnerProgress, config: &Config) -> Result<()> {
    let level = progress.current_level();
    let strip: String = progress
        .recent_activity(&Local::now(), config.activity.window_days)
        .iter()
        .map(|day| match day {
            DayStatus::Active => '■',
            DayStatus::Inactive => '□',
        })
        .collect();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  LEVEL {}", level);
    println!("╰─────────────────────────────────────────╯");
    println!("  Activity: {}  ({} active days)", strip, progress.total_active_days());
    println!();

    for chapter in catalog.chapters() {
        println!("{} [{}]", chapter.name, chapter_status(chapter, level));
        for module in &chapter.modules {
            let marker = match module_status(module, level) {
                ModuleStatus::Finished => "✓",
                ModuleStatus::Current => "▶",
                ModuleStatus::Unavailable => "·",
            };
            println!(
                "  {} {:>3}  {}  (quiz: {})",
                marker,
                module.number,
                module.name,
                quiz_status(module, level)
            );
        }
        println!("  Final review [{}]", final_review_status(chapter, level));
        println!();
    }

    Ok(())
}

fn cmd_projects(catalog: &Catalog, progress: &LearnerProgress) -> Result<()> {
    let board = categorize_projects(catalog.projects(), progress);

    let sections = [
        ("Completed", "✓", &board.completed),
        ("Unlocked", "○", &board.unlocked),
        ("Locked", "✗", &board.locked),
    ];

    for (title, marker, projects) in sections {
        println!("{} ({})", title, projects.len());
        for project in projects.iter() {
            println!(
                "  {} {}  [{}] requires level {}  ({})",
                marker, project.name, project.difficulty, project.level_prerequisite, project.id
            );
        }
        println!();
    }

    Ok(())
}

fn cmd_quiz(
    catalog: &Catalog,
    progress: &LearnerProgress,
    paths: &Paths,
    config: &Config,
    number: u32,
    answers: Option<Vec<String>>,
) -> Result<()> {
    let Some(module) = catalog.module_by_number(number) else {
        return Err(QuizError::UnknownModule(number).into());
    };

    if quiz_status(module, progress.current_level()) == QuizStatus::Unavailable {
        println!(
            "Quiz for module {} is locked (current level {}).",
            number,
            progress.current_level()
        );
        return Ok(());
    }

    let mut session = QuizSession::new(module);
    let mut scripted = answers.map(|a| a.into_iter());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("\n{} quiz", module.name);

    while let Some(question) = session.current_question() {
        println!("\n[{}] {}", session.progress_text(), question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", option_label(i), option);
        }

        let raw = match scripted.as_mut() {
            Some(script) => script.next(),
            None => {
                print!("> ");
                io::stdout().flush()?;
                lines.next().transpose()?
            }
        };
        let Some(raw) = raw else {
            println!("\nQuiz abandoned.");
            return Ok(());
        };

        let choice = resolve_option(question, raw.trim());
        if let Err(e) = session.select(&choice) {
            println!("  {}", e);
            if scripted.is_some() {
                return Err(e.into());
            }
            continue;
        }

        let correct = session.check()?;
        if correct {
            println!("  Correct!");
        } else {
            println!("  Incorrect. The answer is {}.", question.answer);
        }
        session.next()?;
    }

    if let QuizState::Finished { score, total } = session.state() {
        println!("\nScore: {}/{}", score, total);
    }

    let updated = LearnerProgress::update(&paths.progress, config.progress.starting_level, |p| {
        session.apply_result(p);
        Ok(())
    })?;

    if updated.current_level() > progress.current_level() {
        println!("✓ Level up! You are now level {}.", updated.current_level());
    } else {
        println!("Level unchanged ({}).", updated.current_level());
    }

    Ok(())
}

/// Accept an option letter ("B") or the option text itself
fn resolve_option(question: &MultipleChoiceQuestion, input: &str) -> String {
    question
        .options
        .iter()
        .enumerate()
        .find(|(i, _)| option_label(*i).eq_ignore_ascii_case(input))
        .map(|(_, option)| option.clone())
        .unwrap_or_else(|| input.to_string())
}

fn cmd_complete_project(catalog: &Catalog, paths: &Paths, config: &Config, id: &str) -> Result<()> {
    if catalog.project(id).is_none() {
        tracing::warn!("Completing project '{}' which is not in the catalog", id);
        eprintln!("warning: project '{}' is not in the catalog", id);
    }

    let mut newly_completed = false;
    LearnerProgress::update(&paths.progress, config.progress.starting_level, |p| {
        newly_completed = p.complete_project(id);
        Ok(())
    })?;

    if newly_completed {
        println!("✓ Project '{}' completed!", id);
    } else {
        println!("Project '{}' was already completed.", id);
    }

    Ok(())
}

fn cmd_validate(content_dir: &Path) -> Result<()> {
    let (catalog, diagnostics) = load_catalog_dir(content_dir)?;
    let findings = catalog.validate();

    println!(
        "{} chapters, {} modules, {} projects",
        catalog.chapters().len(),
        catalog.module_count(),
        catalog.projects().len()
    );

    if diagnostics.is_empty() && findings.is_empty() {
        println!("✓ Curriculum is valid");
        return Ok(());
    }

    for diagnostic in &diagnostics {
        println!("  - skipped {}", diagnostic);
    }
    for finding in &findings {
        println!("  - {}", finding);
    }
    std::process::exit(1);
}

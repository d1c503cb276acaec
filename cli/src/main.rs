use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kelas::{
    Config,
    api::ApiClient,
    error::{AppResult, run_with_error_handler},
    form::{CategoryForm, CourseForm, LoginForm},
    model::{
        CrudResource,
        entity::{Category, Course, Transaction},
    },
    notify::LogNotifier,
    screen::{
        Catalog, CourseDetail, EnrollClick, LessonAdmin, LessonScreen, UserDashboard,
        category_table, course_table, my_courses_table, my_transactions_table, transaction_table,
    },
    session::Session,
    state::{ListSnapshot, ReviewDecision, StateError, review_transaction},
    utils::files::Upload,
};

#[derive(Parser, Debug)]
#[command(about = "Command line client for the Kelas course marketplace", long_about = None)]
pub struct Cli {
    /// Sign in with this email before running the command
    #[arg(long, global = true, requires = "password")]
    pub email: Option<String>,
    #[arg(long, global = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse, manage and enroll in courses
    Courses {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// Manage and follow lessons
    Lessons {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Completion summary for one course
    Progress { course: String },

    /// Review and list enrollments
    Transactions {
        #[command(subcommand)]
        action: TransactionCommands,
    },

    /// Configuration file helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    /// Query string as used in the browser, e.g. "search=rust&minPrice=50000"
    List {
        #[arg(default_value = "")]
        query: String,
        /// Admin table instead of the public catalog
        #[arg(long, default_value_t = false)]
        table: bool,
    },
    Show {
        id: String,
    },
    Enroll {
        id: String,
    },
    My {
        #[arg(default_value = "")]
        query: String,
    },
    Stats,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        instructor: String,
        #[arg(long)]
        price: i64,
        /// Category id
        #[arg(long)]
        category: String,
        #[arg(long = "goal", required = true)]
        goals: Vec<String>,
        /// Image file, at most 2MB
        #[arg(long)]
        thumbnail: Option<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    List {
        #[arg(default_value = "")]
        query: String,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    List {
        course: String,
    },
    Add {
        #[arg(long)]
        course: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: PathBuf,
        /// Defaults to after the last lesson
        #[arg(long)]
        order: Option<i32>,
    },
    Update {
        #[arg(long)]
        course: String,
        lesson: String,
        #[arg(long)]
        title: Option<String>,
        /// Path to a Markdown file with the new content
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long)]
        order: Option<i32>,
    },
    Delete {
        #[arg(long)]
        course: String,
        lesson: String,
    },
    /// Marks a lesson complete; the first lesson when none is given
    Complete {
        course: String,
        #[arg(long)]
        lesson: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    List {
        #[arg(default_value = "")]
        query: String,
    },
    My {
        #[arg(default_value = "")]
        query: String,
    },
    Approve {
        id: String,
    },
    Reject {
        id: String,
    },
    /// The signed-in viewer's current transaction for a course
    Check {
        course: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Writes the default configuration to the user config directory
    Init {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    kelas::setup_trace();
    let args = Cli::parse();
    run_with_error_handler(|| run(args)).await;
}

async fn run(args: Cli) -> AppResult<()> {
    let config = Config::get_or_init(cfg!(debug_assertions)).await;
    let client = kelas::build_client().await?;
    let mut session = Session::guest();

    if let (Some(email), Some(password)) = (args.email, args.password) {
        let request = LoginForm::new(email, password).into_request()?;
        let user = session.login(&client, request).await?;
        println!("Signed in as {} ({})", user.name(), user.role());
    }

    let notifier = LogNotifier;
    match args.command {
        Commands::Courses { action } => match action {
            CourseCommands::List { query, table: false } => {
                let mut catalog = Catalog::new(&client, config.ui(), &query);
                catalog.load().await;
                print_courses(&client, &catalog.snapshot());
            }
            CourseCommands::List { query, table: true } => {
                let table = course_table(&client, config.ui(), &query);
                table.load().await;
                print_courses(&client, &table.snapshot());
            }
            CourseCommands::Show { id } => {
                let detail = CourseDetail::load(&client, &session, &id).await?;
                print_course_detail(&client, &detail, &session);
            }
            CourseCommands::Enroll { id } => {
                let mut detail = CourseDetail::load(&client, &session, &id).await?;
                match detail.click_enroll(&client, &session, &notifier).await? {
                    EnrollClick::Redirect(_) => println!("Sign in first with --email and --password."),
                    EnrollClick::Enrolled(tx) => println!(
                        "Transaction {} created: {} ({})",
                        tx.id(),
                        rupiah(tx.amount()),
                        tx.status()
                    ),
                }
            }
            CourseCommands::My { query } => {
                let table = my_courses_table(&client, config.ui(), &query);
                table.load().await;
                let snapshot = table.snapshot();
                for course in &snapshot.items {
                    println!(
                        "{}  {:<32} {} lessons completed",
                        course.id(),
                        course.title(),
                        course.completed_lessons_count()
                    );
                }
                print_footer(&snapshot);
            }
            CourseCommands::Stats => {
                let dashboard = UserDashboard::load(&client).await?;
                println!("Enrolled courses:   {}", dashboard.stats.total_courses);
                println!("Completed courses:  {}", dashboard.stats.completed_courses);
                println!("Transactions:       {}", dashboard.stats.total_transactions);
                for course in &dashboard.recent_courses {
                    println!("  {}  {}", course.id(), course.title());
                }
            }
            CourseCommands::Add {
                title,
                description,
                instructor,
                price,
                category,
                goals,
                thumbnail,
            } => {
                let mut form = CourseForm::new();
                form.title = title;
                form.description = description;
                form.instructor = instructor;
                form.price = Some(price);
                form.category = category;
                form.goals = goals;
                form.thumbnail = thumbnail.as_deref().map(Upload::from_path).transpose()?;

                let table = course_table(&client, config.ui(), "");
                let course = table.submit(form, &notifier).await?;
                println!("Course created: {} {}", course.id(), course.title());
                print_footer(&table.snapshot());
            }
            CourseCommands::Delete { id } => {
                let table = course_table(&client, config.ui(), "");
                table.delete_row(&id, &notifier).await?;
                println!("Course {id} deleted");
            }
        },

        Commands::Categories { action } => match action {
            CategoryCommands::List { query } => {
                let table = category_table(&client, config.ui(), &query);
                table.load().await;
                let snapshot = table.snapshot();
                for category in &snapshot.items {
                    println!(
                        "{}  {:<24} {}",
                        category.id(),
                        category.name(),
                        category.description().unwrap_or("-")
                    );
                }
                print_footer(&snapshot);
            }
            CategoryCommands::Add { name, description } => {
                let mut form = CategoryForm::new();
                form.name = name;
                form.description = description.unwrap_or_default();
                let table = category_table(&client, config.ui(), "");
                let category = table.submit(form, &notifier).await?;
                println!("Category created: {} {}", category.id(), category.name());
                print_footer(&table.snapshot());
            }
            CategoryCommands::Update {
                id,
                name,
                description,
            } => {
                let current = Category::find_by_id(&client, &id).await?;
                let mut form = CategoryForm::edit(&current);
                if let Some(name) = name {
                    form.name = name;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                let table = category_table(&client, config.ui(), "");
                let category = table.submit(form, &notifier).await?;
                println!("Category updated: {} {}", category.id(), category.name());
            }
            CategoryCommands::Delete { id } => {
                let table = category_table(&client, config.ui(), "");
                table.delete_row(&id, &notifier).await?;
                println!("Category {id} deleted");
            }
        },

        Commands::Lessons { action } => match action {
            LessonCommands::List { course } => {
                let detail = CourseDetail::load(&client, &session, &course).await?;
                print_lessons(&detail);
            }
            LessonCommands::Add {
                course,
                title,
                file,
                order,
            } => {
                let mut admin = LessonAdmin::load(&client, &course).await?;
                let mut form = admin.new_form();
                form.title = title;
                form.content = std::fs::read_to_string(file)?;
                if order.is_some() {
                    form.order = order;
                }
                let lesson = admin.submit(form, &notifier).await?;
                println!("Lesson created: #{} {}", lesson.order(), lesson.title());
                print_lesson_orders(&admin);
            }
            LessonCommands::Update {
                course,
                lesson,
                title,
                file,
                order,
            } => {
                let mut admin = LessonAdmin::load(&client, &course).await?;
                let Some(mut form) = admin.edit_form(&lesson) else {
                    println!("No lesson {lesson} in course {course}");
                    return Ok(());
                };
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(file) = file {
                    form.content = std::fs::read_to_string(file)?;
                }
                if order.is_some() {
                    form.order = order;
                }
                let updated = admin.submit(form, &notifier).await?;
                println!("Lesson updated: #{} {}", updated.order(), updated.title());
                print_lesson_orders(&admin);
            }
            LessonCommands::Delete { course, lesson } => {
                let mut admin = LessonAdmin::load(&client, &course).await?;
                admin.delete(&lesson, &notifier).await?;
                println!("Lesson {lesson} deleted");
                print_lesson_orders(&admin);
            }
            LessonCommands::Complete { course, lesson } => {
                let mut viewer = match LessonScreen::open(&client, &course, lesson.as_deref()).await? {
                    LessonScreen::Ready(viewer) => viewer,
                    LessonScreen::Locked { redirect } => {
                        println!("Purchase the course first: {redirect}");
                        return Err(StateError::CourseLocked.into());
                    }
                };
                viewer.mark_complete(&client, &notifier).await?;
                let tracker = viewer.tracker();
                if let Some(current) = tracker.current() {
                    println!("{} is complete", current.title());
                }
                println!("Course progress: {:.0}%", tracker.percentage());
                if let Some(next) = tracker.next() {
                    println!("Up next: {}", viewer.lesson_route(next));
                }
            }
        },

        Commands::Progress { course } => {
            let detail = CourseDetail::load(&client, &session, &course).await?;
            let Some(progress) = detail.progress() else {
                println!("No progress recorded for {}", detail.course().title());
                return Ok(());
            };
            println!(
                "{}: {}/{} lessons, {:.0}%",
                detail.course().title(),
                progress.completed_lessons(),
                progress.total_lessons(),
                progress.percentage()
            );
            print_lessons(&detail);
        }

        Commands::Transactions { action } => match action {
            TransactionCommands::List { query } => {
                let table = transaction_table(&client, config.ui(), &query);
                table.load().await;
                print_transactions(&table.snapshot());
            }
            TransactionCommands::My { query } => {
                let table = my_transactions_table(&client, config.ui(), &query);
                table.load().await;
                print_transactions(&table.snapshot());
            }
            TransactionCommands::Approve { id } => {
                review(&client, &id, ReviewDecision::Approve, &notifier).await?;
            }
            TransactionCommands::Reject { id } => {
                review(&client, &id, ReviewDecision::Reject, &notifier).await?;
            }
            TransactionCommands::Check { course } => match Transaction::check(&client, &course).await? {
                Some(tx) => println!(
                    "{}  {}  {}  {}",
                    tx.id(),
                    rupiah(tx.amount()),
                    tx.status(),
                    tx.created_at().format("%Y-%m-%d %H:%M")
                ),
                None => println!("No transaction for course {course}"),
            },
        },

        Commands::Config { action } => config_command(&action)?,
    }

    Ok(())
}

fn config_command(action: &ConfigCommands) -> AppResult<()> {
    let ConfigCommands::Init { force } = action;
    let Some(path) = kelas::config::user_config_file() else {
        println!("No user config directory on this system.");
        return Ok(());
    };
    if path.exists() && !force {
        println!("{} already exists, use --force to overwrite", path.display());
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, Config::default().to_toml()?)?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn review(
    client: &ApiClient,
    id: &str,
    decision: ReviewDecision,
    notifier: &LogNotifier,
) -> AppResult<()> {
    let transaction = Transaction::find_by_id(client, id).await?;
    let updated = review_transaction(client, &transaction, decision, notifier).await?;
    println!("Transaction {} is now {}", updated.id(), updated.status());
    Ok(())
}

/// Indonesian rupiah with dot grouping: `Rp150.000`.
fn rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}Rp{grouped}")
}

fn price_label(course: &Course) -> String {
    if course.is_free() {
        String::from("Free")
    } else {
        rupiah(course.price())
    }
}

fn print_footer<T, P>(snapshot: &ListSnapshot<T, P>) {
    if let Some(error) = &snapshot.error {
        eprintln!("error: {error}");
    }
    if let Some(meta) = snapshot.meta {
        println!("page {} of {} ({} total)", meta.page, snapshot.last_page(), meta.total);
    }
}

fn print_courses<P>(client: &ApiClient, snapshot: &ListSnapshot<Course, P>) {
    for course in &snapshot.items {
        println!(
            "{}  {:<32} {:<16} {:>12}  {}",
            course.id(),
            course.title(),
            course.category().name().unwrap_or("-"),
            price_label(course),
            client.resolve_asset(course.thumbnail_url())
        );
    }
    print_footer(snapshot);
}

fn print_course_detail(client: &ApiClient, detail: &CourseDetail, session: &Session) {
    let course = detail.course();
    println!("{}", course.title());
    println!("by {}  |  {}", course.instructor(), price_label(course));
    println!("{}", client.resolve_asset(course.thumbnail_url()));
    println!();
    println!("{}", course.description());
    println!();
    println!("What you'll learn:");
    for goal in course.goals() {
        println!("  - {goal}");
    }
    println!();
    print_lessons(detail);
    if let Some(label) = detail.enroll_button(session).label() {
        println!();
        println!("[{label}]");
    }
}

fn print_lesson_orders(admin: &LessonAdmin) {
    for lesson in admin.lessons() {
        println!("  {:>3}. {}  {}", lesson.order(), lesson.title(), lesson.id());
    }
}

fn print_lessons(detail: &CourseDetail) {
    for lesson in detail.lessons() {
        let mark = if detail.is_lesson_completed(lesson.id()) {
            "x"
        } else {
            " "
        };
        println!("[{mark}] {:>2}. {}  ({})", lesson.order(), lesson.title(), lesson.id());
    }
}

fn print_transactions<P>(snapshot: &ListSnapshot<Transaction, P>) {
    for tx in &snapshot.items {
        println!(
            "{}  {}  {:<24} {:<24} {:>12}  {}",
            tx.id(),
            tx.created_at().format("%Y-%m-%d"),
            tx.user().name(),
            tx.course().title(),
            rupiah(tx.amount()),
            tx.status()
        );
    }
    print_footer(snapshot);
}

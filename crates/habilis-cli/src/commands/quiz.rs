//! Interactive quiz.
//!
//! Walks the wizard on stdin/stdout: child info, questions, result,
//! checkout. Invalid input is reported and asked again, the way the web
//! form alerted and stayed on the same step.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use habilis_core::checkout::validate_email;
use habilis_core::{
    Catalog, CheckoutError, CheckoutRoute, CheckoutSession, HttpCatalog, PendingCheckout,
    Product, QuizConfig, Wizard, WizardEvent, WizardState,
};

use super::load_config;

#[derive(Args)]
pub struct QuizArgs {
    /// Use configured kit names and prices instead of the backend
    #[arg(long)]
    offline: bool,

    /// Parent email for checkout when not logged in
    #[arg(long)]
    email: Option<String>,

    /// Write the pending checkout record here when login or registration is needed
    #[arg(long)]
    save_pending: Option<PathBuf>,

    /// Skip the quiz and resume checkout from a saved pending record
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Print the checkout route as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(config: Option<&Path>, args: QuizArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let wizard = config.wizard()?;
    let runtime = tokio::runtime::Runtime::new()?;

    let stdin = io::stdin();
    let mut session = Session {
        input: stdin.lock(),
        output: io::stdout(),
    };

    if args.offline {
        let catalog = config.offline_catalog();
        runtime.block_on(drive(&mut session, &config, &wizard, &catalog, &args))
    } else {
        let mut catalog = HttpCatalog::new(&config.api.base_url)?;
        if let Some(cookie) = &config.api.session_cookie {
            catalog = catalog.with_session_cookie(cookie.clone());
        }
        runtime.block_on(drive(&mut session, &config, &wizard, &catalog, &args))
    }
}

/// Line-oriented prompt over any reader and writer.
struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    fn ask(&mut self, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err("input closed before the quiz finished".into());
        }
        Ok(line.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let answer = self.ask(&format!("{prompt} [Y/n] "))?;
        Ok(!matches!(answer.to_ascii_lowercase().as_str(), "n" | "no"))
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{text}")
    }
}

async fn drive<C: Catalog, R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    config: &QuizConfig,
    wizard: &Wizard,
    catalog: &C,
    args: &QuizArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let (state, product, saved_email) = match &args.resume {
        Some(path) => {
            let pending = PendingCheckout::from_json(&std::fs::read_to_string(path)?)?;
            let email = pending.email.clone();
            let (state, product) = pending.resume(wizard.resolver())?;
            session.say("Welcome back. You can now complete your order.")?;
            (state, product, Some(email))
        }
        None => {
            let state = collect_child_info(session, wizard)?;
            let state = answer_questions(session, wizard, state)?;
            let product = show_result(session, config, catalog, &state).await?;

            if !session.confirm("Continue to checkout?")? {
                session.say("No order placed.")?;
                return Ok(());
            }
            let state = wizard.transition(state, WizardEvent::ProceedToCheckout)?;
            (state, product, None)
        }
    };

    let checkout = CheckoutSession::from_state(&state, product)?;
    session.say(&format!(
        "\nOrder summary: {} for {} - {:.2} EUR/month",
        checkout.product.name, checkout.child.name, checkout.product.price
    ))?;

    let email = args.email.clone().or(saved_email);
    let route = plan_checkout(session, catalog, &checkout, email).await?;
    report_route(session, &route, args)?;

    // The saved record is spent once payment can start.
    if let (CheckoutRoute::Payment(_), Some(path)) = (&route, &args.resume) {
        std::fs::remove_file(path)?;
        tracing::debug!(path = %path.display(), "removed pending checkout");
    }
    Ok(())
}

fn collect_child_info<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    wizard: &Wizard,
) -> Result<WizardState, Box<dyn std::error::Error>> {
    loop {
        let name = session.ask("Child's name: ")?;
        let age = session.ask("Child's age: ")?;
        let Ok(age) = age.parse::<u8>() else {
            session.say("Please enter the child's age as a number.")?;
            continue;
        };

        let event = WizardEvent::SubmitChildInfo { name, age };
        match wizard.transition(WizardState::default(), event) {
            Ok(state) => return Ok(state),
            Err(e) => session.say(&format!("Please complete the child's name and age ({e})."))?,
        }
    }
}

fn answer_questions<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    wizard: &Wizard,
    mut state: WizardState,
) -> Result<WizardState, Box<dyn std::error::Error>> {
    let bank = wizard.bank();
    let child = state.child().map(|c| c.name.clone()).unwrap_or_default();

    while let Some(index) = state.current_question() {
        let Some(question) = bank.get(index) else {
            break;
        };

        session.say(&format!("\nQuestion {} of {}", index + 1, bank.len()))?;
        session.say(&question.prompt(&child))?;
        for option in &question.options {
            session.say(&format!("  {}) {}", option.letter, option.text))?;
        }

        let letter = session.ask("> ")?;
        match wizard.transition(state.clone(), WizardEvent::Answer { letter }) {
            Ok(next) => state = next,
            Err(e) => session.say(&format!("{e}"))?,
        }
    }

    Ok(state)
}

async fn show_result<C: Catalog, R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    config: &QuizConfig,
    catalog: &C,
    state: &WizardState,
) -> Result<Product, Box<dyn std::error::Error>> {
    let resolution = state
        .resolution()
        .ok_or("quiz ended without a result")?;
    let child = state.child().map(|c| c.name.as_str()).unwrap_or_default();

    session.say("")?;
    if let Some(info) = config.profile(&resolution.profile) {
        session.say(&format!("Profile: {}", info.display_name))?;
        session.say(&info.headline.replace(habilis_core::quiz::CHILD_PLACEHOLDER, child))?;
    } else {
        session.say(&format!("Profile: {}", resolution.profile))?;
    }

    loop {
        match catalog.product(resolution.product).await {
            Ok(product) => {
                session.say(&format!("\nRecommended kit: {}", product.name))?;
                if let Some(description) = &product.description {
                    session.say(description)?;
                }
                session.say(&format!("{:.2} EUR/month", product.price))?;
                return Ok(product);
            }
            Err(e) => {
                tracing::warn!(
                    product = %resolution.product,
                    error = %e,
                    "failed to load recommended kit"
                );
                session.say(&format!("Could not load the recommended kit: {e}"))?;
                if !session.confirm("Retry?")? {
                    return Err(e.into());
                }
            }
        }
    }
}

async fn plan_checkout<C: Catalog, R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    catalog: &C,
    checkout: &CheckoutSession,
    mut email: Option<String>,
) -> Result<CheckoutRoute, Box<dyn std::error::Error>> {
    let account = catalog.current_account().await?;
    if let Some(account) = &account {
        tracing::debug!(email = %account.email, "user already logged in");
    }

    loop {
        if account.is_none() && email.is_none() {
            email = Some(session.ask("Your email: ")?);
        }

        // Only well-formed addresses are sent to the backend.
        let email_exists = match (&account, validate_email(email.as_deref())) {
            (None, Ok(valid)) => match catalog.email_exists(valid).await {
                Ok(exists) => Some(exists),
                Err(e) => {
                    tracing::warn!(error = %e, "email check failed, falling back to registration");
                    None
                }
            },
            _ => None,
        };

        match checkout.plan(account.as_ref(), email.as_deref(), email_exists) {
            Ok(route) => return Ok(route),
            Err(e @ (CheckoutError::MissingEmail | CheckoutError::InvalidEmail(_))) => {
                session.say(&format!("{e}"))?;
                email = None;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn report_route<R: BufRead, W: Write>(
    session: &mut Session<R, W>,
    route: &CheckoutRoute,
    args: &QuizArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pending = match route {
        CheckoutRoute::Payment(payment) => {
            session.say(&format!(
                "Continue to secure payment as {} ({:.2} EUR/month).",
                payment.user_email, payment.product_price
            ))?;
            None
        }
        CheckoutRoute::Login { email, pending } => {
            session.say(&format!(
                "You already have an account with {email}. Log in to continue."
            ))?;
            Some(pending)
        }
        CheckoutRoute::Register { pending, .. } => {
            session.say(
                "To complete your order you need to create an account. \
                 Your quiz answers are saved.",
            )?;
            Some(pending)
        }
    };

    if let (Some(pending), Some(path)) = (pending, &args.save_pending) {
        std::fs::write(path, pending.to_json()?)?;
        session.say(&format!("Saved checkout to {}", path.display()))?;
    }

    if args.json {
        session.say(&serde_json::to_string_pretty(route)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use habilis_core::{Account, CatalogError, ProductRef, StaticCatalog};

    /// Offline catalog that remembers which emails were looked up.
    struct RecordingCatalog {
        inner: StaticCatalog,
        checked: Mutex<Vec<String>>,
    }

    impl Catalog for RecordingCatalog {
        async fn product(&self, id: ProductRef) -> Result<Product, CatalogError> {
            self.inner.product(id).await
        }

        async fn current_account(&self) -> Result<Option<Account>, CatalogError> {
            self.inner.current_account().await
        }

        async fn email_exists(&self, email: &str) -> Result<bool, CatalogError> {
            self.checked.lock().unwrap().push(email.to_string());
            self.inner.email_exists(email).await
        }
    }

    fn session(input: &str) -> Session<&[u8], Vec<u8>> {
        Session {
            input: input.as_bytes(),
            output: Vec::new(),
        }
    }

    fn args() -> QuizArgs {
        QuizArgs {
            offline: true,
            email: None,
            save_pending: None,
            resume: None,
            json: false,
        }
    }

    #[tokio::test]
    async fn invalid_input_is_asked_again() {
        let config = QuizConfig::default();
        let wizard = config.wizard().unwrap();
        let catalog = config.offline_catalog().with_account(Account {
            id: 1,
            email: "ana@example.com".to_string(),
        });

        // blank name, bad age, then valid; one bad letter; then five answers
        let input = "\n4\nLucia\nfour\nLucia\n4\nZ\nA\nA\nA\nA\nA\ny\n";
        let mut s = session(input);
        drive(&mut s, &config, &wizard, &catalog, &args()).await.unwrap();

        let output = String::from_utf8(s.output).unwrap();
        assert!(output.contains("Please complete the child's name and age"));
        assert!(output.contains("Please enter the child's age as a number."));
        assert!(output.contains("question 0 has no option 'Z'"));
        assert!(output.contains("Profile: Logical-Mathematical"));
        assert!(output.contains("Continue to secure payment as ana@example.com"));
    }

    #[tokio::test]
    async fn anonymous_user_is_sent_to_registration() {
        let config = QuizConfig::default();
        let wizard = config.wizard().unwrap();
        let catalog = config.offline_catalog();

        let input = "Mateo\n7\nC\nB\nC\nB\nB\ny\nnot-an-email\nnew@example.com\n";
        let mut s = session(input);
        drive(&mut s, &config, &wizard, &catalog, &args()).await.unwrap();

        let output = String::from_utf8(s.output).unwrap();
        assert!(output.contains("Recommended kit: Maker Kit: Robotic Arm"));
        assert!(output.contains("'not-an-email' is not a valid email address"));
        assert!(output.contains("you need to create an account"));
    }

    #[tokio::test]
    async fn declining_checkout_places_no_order() {
        let config = QuizConfig::default();
        let wizard = config.wizard().unwrap();
        let catalog = config.offline_catalog();

        let mut s = session("Lucia\n4\nA\nA\nA\nA\nA\nn\n");
        drive(&mut s, &config, &wizard, &catalog, &args()).await.unwrap();

        let output = String::from_utf8(s.output).unwrap();
        assert!(output.contains("No order placed."));
    }

    #[tokio::test]
    async fn closed_input_is_an_error() {
        let config = QuizConfig::default();
        let wizard = config.wizard().unwrap();
        let catalog = config.offline_catalog();

        let mut s = session("Lucia\n");
        assert!(drive(&mut s, &config, &wizard, &catalog, &args()).await.is_err());
    }

    #[tokio::test]
    async fn malformed_email_is_not_looked_up() {
        let config = QuizConfig::default();
        let wizard = config.wizard().unwrap();
        let catalog = RecordingCatalog {
            inner: config.offline_catalog(),
            checked: Mutex::new(Vec::new()),
        };

        let input = "Mateo\n7\nC\nB\nC\nB\nB\ny\nnot-an-email\n\nnew@example.com\n";
        let mut s = session(input);
        drive(&mut s, &config, &wizard, &catalog, &args()).await.unwrap();

        assert_eq!(*catalog.checked.lock().unwrap(), vec!["new@example.com".to_string()]);
    }
}

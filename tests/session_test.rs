// Interactive session driven by a scripted prompter and a mock transport.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use backoffice_cli::api::{ApiClient, ApiError, Transport};
use backoffice_cli::error::{CliError, CliResult};
use backoffice_cli::form::{FormOutcome, ProductForm, REQUIRED};
use backoffice_cli::ui::{Prompter, Session, SessionState};

const API: &str = "http://api.test";

#[derive(Default)]
struct MockTransport {
    routes: HashMap<(Method, String), String>,
    calls: RefCell<Vec<(Method, String, Option<Value>)>>,
}

impl MockTransport {
    fn with(mut self, method: Method, path: &str, body: &str) -> Self {
        self.routes
            .insert((method, format!("{API}/{path}")), body.to_string());
        self
    }

    fn calls(&self) -> Vec<(Method, String, Option<Value>)> {
        self.calls.borrow().clone()
    }

    fn posts(&self) -> usize {
        self.calls().iter().filter(|c| c.0 == Method::POST).count()
    }
}

impl Transport for MockTransport {
    fn send(&self, method: Method, url: &str, body: Option<&Value>) -> Result<String, ApiError> {
        let key = (method.clone(), url.to_string());
        self.calls
            .borrow_mut()
            .push((method, url.to_string(), body.cloned()));
        self.routes.get(&key).cloned().ok_or_else(|| ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            url: url.to_string(),
            body: String::new(),
        })
    }
}

/// Prompter that answers from scripts and feeds key events into the real
/// form state machine.
#[derive(Default)]
struct ScriptedPrompter {
    categories: VecDeque<String>,
    forms: VecDeque<Vec<KeyEvent>>,
    clears: usize,
    form_errors: Vec<String>,
}

impl ScriptedPrompter {
    fn new(categories: &[&str], forms: Vec<Vec<KeyEvent>>) -> Self {
        ScriptedPrompter {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            forms: forms.into(),
            ..Default::default()
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn select_category(&mut self, categories: &[String]) -> CliResult<String> {
        let choice = self.categories.pop_front().ok_or(CliError::Interrupted)?;
        assert!(categories.contains(&choice));
        Ok(choice)
    }

    fn add_product(&mut self, _category: &str) -> FormOutcome {
        let Some(keys) = self.forms.pop_front() else {
            return FormOutcome::Failed(CliError::Interrupted);
        };
        let mut form = ProductForm::new();
        for key in keys {
            let submit = key.code == KeyCode::Enter;
            if let Some(outcome) = form.handle_key(key) {
                return outcome;
            }
            if submit {
                self.form_errors
                    .extend(form.error().map(str::to_string));
            }
        }
        FormOutcome::Failed(CliError::Interrupted)
    }

    fn clear_screen(&mut self) -> CliResult<()> {
        self.clears += 1;
        Ok(())
    }
}

fn text(s: &str) -> Vec<KeyEvent> {
    s.chars()
        .map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
        .collect()
}

fn key(code: KeyCode) -> Vec<KeyEvent> {
    vec![KeyEvent::new(code, KeyModifiers::NONE)]
}

fn ctrl_q() -> Vec<KeyEvent> {
    vec![KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)]
}

fn fill(name: &str, rrp: &str, info: &str) -> Vec<KeyEvent> {
    [
        text(name),
        key(KeyCode::Tab),
        text(rrp),
        key(KeyCode::Tab),
        text(info),
        key(KeyCode::Enter),
    ]
    .concat()
}

fn categories() -> Vec<String> {
    vec!["confectionery".into(), "electronics".into()]
}

const FUDGE: &str = r#"[{"id":1,"name":"Fudge","rrp":2.5,"info":"Sweet"}]"#;
const FUDGE_AND_TOFFEE: &str = r#"[{"id":1,"name":"Fudge","rrp":2.5,"info":"Sweet"},{"id":2,"name":"Toffee","rrp":1.75,"info":"Chewy"}]"#;

#[test]
fn submitted_product_replaces_the_list_and_returns_to_browsing() {
    let transport = MockTransport::default()
        .with(Method::GET, "confectionery", FUDGE)
        .with(Method::POST, "confectionery", FUDGE_AND_TOFFEE);
    let api = ApiClient::new(&transport, API);
    let cats = categories();
    let mut prompter = ScriptedPrompter::new(&["confectionery"], vec![fill("Toffee", "1.75", "Chewy")]);
    let mut out = Vec::new();

    {
        let mut session = Session::new(&api, &cats, &mut prompter, &mut out);
        session.step().unwrap();
        assert!(matches!(
            session.state(),
            SessionState::Browsing { products, .. } if products.len() == 1
        ));
        session.step().unwrap();
        assert_eq!(
            session.state(),
            &SessionState::AddingProduct {
                category: "confectionery".into()
            }
        );
        session.step().unwrap();
        match session.state() {
            SessionState::Browsing { category, products } => {
                assert_eq!(category, "confectionery");
                assert_eq!(products.len(), 2);
                assert_eq!(products[1].name, "Toffee");
            }
            other => panic!("expected browsing, got {other:?}"),
        }
        session.step().unwrap();
    }

    assert_eq!(prompter.clears, 1);
    assert_eq!(
        transport.calls()[1],
        (
            Method::POST,
            format!("{API}/confectionery"),
            Some(json!({ "name": "Toffee", "rrp": 1.75, "info": "Chewy" }))
        )
    );

    let out = String::from_utf8(out).unwrap();
    let banner = out.find("Category").unwrap();
    assert!(out[..banner].contains("Fudge"));
    assert!(!out[..banner].contains("Toffee"));
    assert!(out[banner..].contains("Toffee"));
    assert!(out[banner..].contains("Chewy"));
}

#[test]
fn empty_name_never_posts_and_reprompts() {
    let transport = MockTransport::default().with(Method::GET, "confectionery", FUDGE);
    let api = ApiClient::new(&transport, API);
    let cats = categories();
    let mut prompter = ScriptedPrompter::new(&["confectionery"], vec![fill("", "3", "Hard")]);
    let mut out = Vec::new();

    let err = Session::new(&api, &cats, &mut prompter, &mut out)
        .run()
        .unwrap_err();

    assert!(matches!(err, CliError::Interrupted));
    assert_eq!(prompter.form_errors, vec![REQUIRED.to_string()]);
    assert_eq!(transport.posts(), 0);
}

#[test]
fn cancelling_the_form_goes_back_to_category_selection() {
    let transport = MockTransport::default()
        .with(Method::GET, "confectionery", FUDGE)
        .with(Method::GET, "electronics", "[]");
    let api = ApiClient::new(&transport, API);
    let cats = categories();
    let mut form = text("Half");
    form.extend(ctrl_q());
    let mut prompter = ScriptedPrompter::new(&["confectionery", "electronics"], vec![form]);
    let mut out = Vec::new();

    {
        let mut session = Session::new(&api, &cats, &mut prompter, &mut out);
        session.step().unwrap();
        session.step().unwrap();
        session.step().unwrap();
        assert_eq!(session.state(), &SessionState::SelectingCategory);
        assert_eq!(transport.calls().len(), 1);

        session.step().unwrap();
        assert!(matches!(
            session.state(),
            SessionState::Browsing { category, .. } if category == "electronics"
        ));
    }

    assert_eq!(prompter.clears, 1);
    assert_eq!(transport.posts(), 0);
    assert_eq!(transport.calls().len(), 2);
}

#[test]
fn failed_post_ends_the_session() {
    let transport = MockTransport::default().with(Method::GET, "electronics", "[]");
    let api = ApiClient::new(&transport, API);
    let cats = categories();
    let mut prompter = ScriptedPrompter::new(&["electronics"], vec![fill("Radio", "40", "FM")]);
    let mut out = Vec::new();

    let err = Session::new(&api, &cats, &mut prompter, &mut out)
        .run()
        .unwrap_err();

    assert!(matches!(
        err,
        CliError::Api(ApiError::Status { status, .. }) if status == StatusCode::BAD_GATEWAY
    ));
    assert_eq!(prompter.clears, 0);
}

#[test]
fn failed_fetch_ends_the_session_before_the_form() {
    let transport = MockTransport::default();
    let api = ApiClient::new(&transport, API);
    let cats = categories();
    let mut prompter = ScriptedPrompter::new(&["confectionery"], vec![]);
    let mut out = Vec::new();

    let err = Session::new(&api, &cats, &mut prompter, &mut out)
        .run()
        .unwrap_err();

    assert!(matches!(err, CliError::Api(_)));
    assert!(out.is_empty());
}

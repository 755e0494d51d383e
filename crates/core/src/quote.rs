//! Quote request form: catalogue, per-step validation and the wizard state machine.
//!
//! The public quote form is a five-step wizard. The same validation runs on
//! the server when a quote is submitted, so a client that skips the wizard
//! still gets field-level errors.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

pub const DEFAULT_COUNTRY_CODE: &str = "+351";

/// Dialling codes offered by the form. Other `+<digits>` codes are accepted.
pub const COUNTRY_CODES: &[(&str, &str)] = &[
    ("+351", "Portugal"),
    ("+55", "Brasil"),
    ("+34", "Espanha"),
    ("+33", "França"),
    ("+44", "Reino Unido"),
    ("+1", "EUA"),
];

pub const BUSINESS_SEGMENTS: &[&str] = &[
    "Restaurante / Alimentação",
    "Loja / E-commerce",
    "Saúde / Medicina",
    "Educação / Cursos",
    "Advocacia / Jurídico",
    "Imobiliária / Construção",
    "Beleza / Estética",
    "Academia / Fitness",
    "Tecnologia / Startup",
    "Consultoria / Serviços",
    "Arte / Entretenimento",
    "Outro",
];

pub const ADDITIONAL_PAYMENT_ONLINE: &str = "payment_online";
pub const ADDITIONAL_SCHEDULING: &str = "scheduling";
pub const ADDITIONAL_ADMIN_PANEL: &str = "admin_panel";
pub const ADDITIONAL_CHAT: &str = "chat";

/// Optional features a client can tick, as `(id, label)`.
pub const ADDITIONALS: &[(&str, &str)] = &[
    (ADDITIONAL_PAYMENT_ONLINE, "Pagamento Online"),
    (ADDITIONAL_SCHEDULING, "Agendamento"),
    (ADDITIONAL_ADMIN_PANEL, "Painel Administrativo"),
    (ADDITIONAL_CHAT, "Chat / Atendimento"),
];

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const PHONE_MIN_LENGTH: usize = 9;
pub const DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Number of input steps before submission.
pub const STEP_COUNT: u8 = 5;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

static COUNTRY_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+\d{1,4}$").expect("valid country code regex"));

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What the client wants built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Website,
    App,
}

impl ServiceType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "website" => Some(Self::Website),
            "app" => Some(Self::App),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::App => "app",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::App => "Aplicativo",
        }
    }
}

/// Lifecycle of a quote request as managed from the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

pub const VALID_QUOTE_STATUSES: &[&str] = &["pending", "in_progress", "completed", "rejected"];

impl QuoteStatus {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!(
                "Invalid quote status '{s}'. Must be one of: {}",
                VALID_QUOTE_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// Wizard position. Steps 1-5 collect input; `Submitted` is the thank-you screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStep {
    PersonalDetails,
    ServiceType,
    BusinessSegment,
    Features,
    Description,
    Submitted,
}

impl QuoteStep {
    /// Map a 1-based step number from the client. `6` is the submitted screen.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::PersonalDetails),
            2 => Some(Self::ServiceType),
            3 => Some(Self::BusinessSegment),
            4 => Some(Self::Features),
            5 => Some(Self::Description),
            6 => Some(Self::Submitted),
            _ => None,
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::PersonalDetails => 1,
            Self::ServiceType => 2,
            Self::BusinessSegment => 3,
            Self::Features => 4,
            Self::Description => 5,
            Self::Submitted => 6,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::PersonalDetails => "Dados Pessoais",
            Self::ServiceType => "Tipo de Projeto",
            Self::BusinessSegment => "Segmento",
            Self::Features => "Funcionalidades",
            Self::Description => "Descrição",
            Self::Submitted => "Enviado",
        }
    }

    fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::Submitted)
    }

    fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::PersonalDetails)
    }
}

// ---------------------------------------------------------------------------
// Draft + validation
// ---------------------------------------------------------------------------

/// Everything the quote form collects. Fields are raw strings until validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub country_code: String,
    pub service_type: String,
    pub business_segment: String,
    pub additionals: Vec<String>,
    pub project_description: String,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            service_type: String::new(),
            business_segment: String::new(),
            additionals: Vec::new(),
            project_description: String::new(),
        }
    }
}

impl QuoteDraft {
    /// Trim free-text fields, default an empty country code and drop duplicate additionals.
    pub fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_string();
        self.phone = self.phone.trim().to_string();
        self.country_code = self.country_code.trim().to_string();
        if self.country_code.is_empty() {
            self.country_code = DEFAULT_COUNTRY_CODE.to_string();
        }
        self.service_type = self.service_type.trim().to_string();
        self.business_segment = self.business_segment.trim().to_string();
        self.project_description = self.project_description.trim().to_string();

        let mut seen = Vec::with_capacity(self.additionals.len());
        for id in self.additionals.drain(..) {
            let id = id.trim().to_string();
            if !seen.contains(&id) {
                seen.push(id);
            }
        }
        self.additionals = seen;
        self
    }
}

fn validate_name(errors: &mut FieldErrors, field: &str, value: &str, label: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, format!("{label} is required"));
    } else if len < NAME_MIN_LENGTH {
        errors.add(
            field,
            format!("{label} must be at least {NAME_MIN_LENGTH} characters"),
        );
    } else if len > NAME_MAX_LENGTH {
        errors.add(
            field,
            format!("{label} must be at most {NAME_MAX_LENGTH} characters"),
        );
    }
}

/// Returns `true` when `email` has the `local@domain.tld` shape.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate the fields that belong to a single wizard step.
pub fn validate_step(step: QuoteStep, draft: &QuoteDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    match step {
        QuoteStep::PersonalDetails => {
            validate_name(&mut errors, "first_name", &draft.first_name, "First name");
            validate_name(&mut errors, "last_name", &draft.last_name, "Last name");

            let email = draft.email.trim();
            if email.is_empty() {
                errors.add("email", "Email is required");
            } else if !is_valid_email(email) {
                errors.add("email", "Invalid email");
            }

            let phone = draft.phone.trim();
            if phone.is_empty() {
                errors.add("phone", "Phone is required");
            } else if phone.chars().count() < PHONE_MIN_LENGTH {
                errors.add("phone", "Invalid phone number");
            }

            let code = draft.country_code.trim();
            if !code.is_empty() && !COUNTRY_CODE_RE.is_match(code) {
                errors.add("country_code", "Invalid country code");
            }
        }
        QuoteStep::ServiceType => {
            let service = draft.service_type.trim();
            if service.is_empty() {
                errors.add("service_type", "Select a project type");
            } else if ServiceType::parse(service).is_none() {
                errors.add("service_type", "Project type must be 'website' or 'app'");
            }
        }
        QuoteStep::BusinessSegment => {
            if draft.business_segment.trim().is_empty() {
                errors.add("business_segment", "Select a business segment");
            }
        }
        QuoteStep::Features => {
            if let Some(unknown) = draft
                .additionals
                .iter()
                .find(|id| !ADDITIONALS.iter().any(|(known, _)| known == &id.trim()))
            {
                errors.add("additionals", format!("Unknown feature '{unknown}'"));
            }
        }
        QuoteStep::Description => {
            if draft.project_description.chars().count() > DESCRIPTION_MAX_LENGTH {
                errors.add(
                    "project_description",
                    format!("Description must be at most {DESCRIPTION_MAX_LENGTH} characters"),
                );
            }
        }
        QuoteStep::Submitted => {}
    }

    errors.into_result()
}

/// Validate every input step, collecting all field errors at once.
pub fn validate_all(draft: &QuoteDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for n in 1..=STEP_COUNT {
        if let Some(step) = QuoteStep::from_number(n) {
            if let Err(step_errors) = validate_step(step, draft) {
                errors.merge(step_errors);
            }
        }
    }
    errors.into_result()
}

// ---------------------------------------------------------------------------
// Wizard state machine
// ---------------------------------------------------------------------------

/// Outcome of [`QuoteWizard::next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Moved on to the given step.
    Moved(QuoteStep),
    /// The current step is invalid; the wizard stays where it is.
    Blocked(FieldErrors),
    /// The last step validated; the draft should now be submitted.
    ReadyToSubmit,
    /// Already submitted; nothing to do.
    Done,
}

/// Bookkeeping for the multi-step quote form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteWizard {
    step: QuoteStep,
    draft: QuoteDraft,
    errors: FieldErrors,
}

impl Default for QuoteWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteWizard {
    pub fn new() -> Self {
        Self {
            step: QuoteStep::PersonalDetails,
            draft: QuoteDraft::default(),
            errors: FieldErrors::new(),
        }
    }

    pub fn step(&self) -> QuoteStep {
        self.step
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut QuoteDraft {
        &mut self.draft
    }

    /// Errors from the last blocked [`next`](Self::next) call.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Percentage shown in the progress bar (step / 5).
    pub fn progress_percent(&self) -> u8 {
        let n = u16::from(self.step.number().min(STEP_COUNT));
        (n * 100 / u16::from(STEP_COUNT)) as u8
    }

    /// Validate the current step and advance when it passes.
    pub fn next(&mut self) -> Advance {
        if self.step == QuoteStep::Submitted {
            return Advance::Done;
        }
        if let Err(errors) = validate_step(self.step, &self.draft) {
            self.errors = errors.clone();
            return Advance::Blocked(errors);
        }
        self.errors = FieldErrors::new();
        if self.step == QuoteStep::Description {
            return Advance::ReadyToSubmit;
        }
        self.step = self.step.next();
        Advance::Moved(self.step)
    }

    /// Go back one step. Never leaves step 1 and is a no-op once submitted.
    pub fn back(&mut self) -> QuoteStep {
        if self.step != QuoteStep::Submitted {
            self.step = self.step.previous();
        }
        self.step
    }

    /// Tick or untick an optional feature. Returns whether it is now selected.
    pub fn toggle_additional(&mut self, id: &str) -> bool {
        if let Some(pos) = self.draft.additionals.iter().position(|a| a == id) {
            self.draft.additionals.remove(pos);
            false
        } else {
            self.draft.additionals.push(id.to_string());
            true
        }
    }

    /// Move to the thank-you screen after a successful submission.
    pub fn mark_submitted(&mut self) {
        self.step = QuoteStep::Submitted;
    }

    /// Start over with an empty form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// ---------------------------------------------------------------------------
// Notification text
// ---------------------------------------------------------------------------

/// Label for an additional id, falling back to the raw id.
pub fn additional_label(id: &str) -> &str {
    ADDITIONALS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, label)| *label)
        .unwrap_or(id)
}

/// WhatsApp message sent to the agency when a quote arrives.
pub fn notification_message(draft: &QuoteDraft) -> String {
    let service = ServiceType::parse(&draft.service_type)
        .map(|s| s.label())
        .unwrap_or("Aplicativo");
    let extras = if draft.additionals.is_empty() {
        "Nenhuma".to_string()
    } else {
        draft.additionals.join(", ")
    };
    let description = if draft.project_description.trim().is_empty() {
        "Nao informada"
    } else {
        draft.project_description.as_str()
    };

    format!(
        "*Novo Orcamento Recebido!*\n\n\
         *Nome:* {} {}\n\
         *Email:* {}\n\
         *Telefone:* {} {}\n\
         *Tipo:* {}\n\
         *Segmento:* {}\n\
         *Extras:* {}\n\
         *Descricao:* {}",
        draft.first_name,
        draft.last_name,
        draft.email,
        draft.country_code,
        draft.phone,
        service,
        draft.business_segment,
        extras,
        description,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

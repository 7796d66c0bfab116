use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Skills,
    Strengths,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::Email,
        FormField::Skills,
        FormField::Strengths,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "Full name",
            FormField::Email => "Email",
            FormField::Skills => "Skills (comma separated)",
            FormField::Strengths => "Strengths (comma separated)",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FormField::Name => "e.g. Nguyễn Văn A",
            FormField::Email => "example@gmail.com",
            FormField::Skills => "e.g. MC, English, Design",
            FormField::Strengths => "e.g. Enthusiastic, Disciplined",
        }
    }

    fn index(self) -> usize {
        match self {
            FormField::Name => 0,
            FormField::Email => 1,
            FormField::Skills => 2,
            FormField::Strengths => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Email must look like name@domain")]
    EmailInvalid,
}

impl FieldError {
    pub fn field(self) -> FormField {
        match self {
            FieldError::NameRequired => FormField::Name,
            FieldError::EmailRequired | FieldError::EmailInvalid => FormField::Email,
        }
    }
}

/// Raw text captured by the add-member form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub skills: String,
    pub strengths: String,
}

impl MemberDraft {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::NameRequired);
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::EmailRequired);
        } else if !looks_like_email(email) {
            errors.push(FieldError::EmailInvalid);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn looks_like_email(raw: &str) -> bool {
    match raw.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !raw.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone)]
pub struct AddMemberForm {
    values: [String; 4],
    pub focus: FormField,
    pub errors: Vec<FieldError>,
}

impl Default for AddMemberForm {
    fn default() -> Self {
        Self::new()
    }
}

impl AddMemberForm {
    pub fn new() -> Self {
        Self {
            values: Default::default(),
            focus: FormField::Name,
            errors: Vec::new(),
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        &self.values[field.index()]
    }

    pub fn set_value(&mut self, field: FormField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
        self.errors.retain(|err| err.field() != field);
    }

    pub fn push_char(&mut self, ch: char) {
        let field = self.focus;
        self.values[field.index()].push(ch);
        self.errors.retain(|err| err.field() != field);
    }

    pub fn pop_char(&mut self) {
        let field = self.focus;
        self.values[field.index()].pop();
        self.errors.retain(|err| err.field() != field);
    }

    pub fn focus_next(&mut self) {
        let idx = (self.focus.index() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[idx];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        let idx = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ALL[idx];
    }

    pub fn errors_for(&self, field: FormField) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |err| err.field() == field)
    }

    pub fn draft(&self) -> MemberDraft {
        MemberDraft {
            name: self.value(FormField::Name).to_string(),
            email: self.value(FormField::Email).to_string(),
            skills: self.value(FormField::Skills).to_string(),
            strengths: self.value(FormField::Strengths).to_string(),
        }
    }

    /// Records validation errors and moves focus to the first invalid field.
    pub fn reject(&mut self, errors: Vec<FieldError>) {
        if let Some(first) = errors.first() {
            self.focus = first.field();
        }
        self.errors = errors;
    }
}

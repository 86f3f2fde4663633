/// Initial state of an editor view model and the options handed to a text
/// editor when it is created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    pub text: String,
    pub mimetype: String,
    pub filename: String,
    pub fixed_height: bool,
    pub line_numbers: bool,
    pub read_only: bool,
    pub tab_size: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            text: String::new(),
            mimetype: String::new(),
            filename: String::new(),
            fixed_height: false,
            line_numbers: true,
            read_only: false,
            tab_size: 4,
        }
    }
}

impl EditorConfig {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_fixed_height(mut self, fixed_height: bool) -> Self {
        self.fixed_height = fixed_height;
        self
    }

    pub fn with_line_numbers(mut self, line_numbers: bool) -> Self {
        self.line_numbers = line_numbers;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_tab_size(mut self, tab_size: u32) -> Self {
        self.tab_size = tab_size;
        self
    }

    /// The syntax mode these settings select, from the mimetype first and
    /// the file name second.
    pub fn mode(&self) -> Option<&'static str> {
        crate::modes::mode_for_mime(&self.mimetype)
            .or_else(|| crate::modes::mode_for_file_name(&self.filename))
    }
}

/// A single option pushed to a live text editor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorOption {
    Mode(String),
    LineNumbers(bool),
    TabSize(u32),
    ReadOnly(bool),
}

impl EditorOption {
    pub fn name(&self) -> &'static str {
        match self {
            EditorOption::Mode(_) => "mode",
            EditorOption::LineNumbers(_) => "lineNumbers",
            EditorOption::TabSize(_) => "tabSize",
            EditorOption::ReadOnly(_) => "readOnly",
        }
    }
}

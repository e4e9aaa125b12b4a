// Triggers
// CI, pull-request and scheduled trigger configuration

/// Include/exclude filter used for branches, paths and tags
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Filter {
    pub fn include<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include: patterns.into_iter().map(Into::into).collect(),
            exclude: Vec::new(),
        }
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// CI trigger configuration
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// `trigger: none`
    None,
    Config(TriggerConfig),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriggerConfig {
    pub batch: Option<bool>,
    pub branches: Option<Filter>,
    pub paths: Option<Filter>,
    pub tags: Option<Filter>,
}

impl Trigger {
    /// Trigger on pushes to the given branches
    pub fn branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Trigger::Config(TriggerConfig {
            branches: Some(Filter::include(branches)),
            ..Default::default()
        })
    }
}

/// PR trigger configuration
#[derive(Debug, Clone, PartialEq)]
pub enum PrTrigger {
    /// `pr: none`
    None,
    Config(PrTriggerConfig),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrTriggerConfig {
    pub auto_cancel: Option<bool>,
    pub branches: Option<Filter>,
    pub paths: Option<Filter>,
    pub drafts: Option<bool>,
}

impl PrTrigger {
    /// PRs targeting a single branch
    pub fn new(branch: impl Into<String>) -> Self {
        Self::branches([branch.into()])
    }

    /// PRs targeting any of the given branches
    pub fn branches<I, S>(branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrTrigger::Config(PrTriggerConfig {
            branches: Some(Filter::include(branches)),
            ..Default::default()
        })
    }
}

/// Scheduled trigger
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub cron: String,
    pub display_name: Option<String>,
    pub branches: Filter,
    pub always: bool,
    pub batch: bool,
}

impl Schedule {
    pub fn new(cron: impl Into<String>, branches: Filter) -> Self {
        Self {
            cron: cron.into(),
            display_name: None,
            branches,
            always: false,
            batch: false,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Run even when there are no source changes since the last run
    pub fn always(mut self) -> Self {
        self.always = true;
        self
    }
}

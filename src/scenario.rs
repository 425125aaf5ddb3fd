//! Runtime smoke scenario: fetch a packaged runtime with Maven, unpack it and
//! run the core IVT from the command line on the session host.

use camino::Utf8Path;
use std::io;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info};

use shellproof_runner::{CommandResult, CommandSpec, ExecutionError};
use shellproof_utils::error::{ErrorCategory, UserFriendlyError};
use shellproof_utils::logging::{log_step_complete, step_span};

use crate::context::TestContext;
use crate::template::{TemplateError, render_settings};

/// Where the rendered Maven settings go, relative to the remote home
pub const SETTINGS_PATH: &str = ".m2/settings.xml";

pub const STEP_PREPARE_SETTINGS: &str = "prepare_settings";
pub const STEP_FETCH_RUNTIME: &str = "fetch_runtime";
pub const STEP_UNPACK_RUNTIME: &str = "unpack_runtime";
pub const STEP_RUN_CORE_IVT: &str = "run_core_ivt";

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("No Maven repository configured")]
    MissingRepository,

    #[error("Failed to render settings: {0}")]
    Template(#[from] TemplateError),

    #[error("Remote file operation failed on {path}: {source}")]
    RemoteFile {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Step {step} could not run: {source}")]
    Execution {
        step: &'static str,
        #[source]
        source: ExecutionError,
    },

    #[error("Step {step} failed: {}", marker_text(.exit_marker))]
    StepFailed {
        step: &'static str,
        exit_marker: Option<i32>,
    },
}

pub(crate) fn marker_text(exit_marker: &Option<i32>) -> String {
    match exit_marker {
        Some(value) => format!("exit marker {value}"),
        None => "exit marker missing from output".to_string(),
    }
}

impl UserFriendlyError for ScenarioError {
    fn user_message(&self) -> String {
        match self {
            Self::Execution { step, source } => {
                format!("Step '{step}': {}", source.user_message())
            }
            Self::Template(err) => err.user_message(),
            _ => self.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::StepFailed { step, .. } => Some(format!(
                "The command for '{step}' ran but did not report status 0. Its log is in the evidence directory."
            )),
            Self::Execution { source, .. } => source.context(),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::MissingRepository => vec![
                "Set [runtime].maven_repository in .shellproof/config.toml".to_string(),
                "Or pass --repository / set SHELLPROOF_MAVEN_REPOSITORY".to_string(),
            ],
            Self::StepFailed { step, .. } => match *step {
                STEP_FETCH_RUNTIME => vec!["Inspect mvn.log for resolution errors".to_string()],
                STEP_UNPACK_RUNTIME => vec!["Inspect unzip.log; is unzip installed?".to_string()],
                STEP_RUN_CORE_IVT => vec!["Inspect coreivt.log for the failing test".to_string()],
                _ => Vec::new(),
            },
            Self::RemoteFile { .. } => {
                vec!["Check that the remote home directory is writable".to_string()]
            }
            Self::Execution { source, .. } => source.suggestions(),
            Self::Template(err) => err.suggestions(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingRepository => ErrorCategory::Configuration,
            Self::Template(_) => ErrorCategory::Validation,
            Self::RemoteFile { .. } => ErrorCategory::FileSystem,
            Self::Execution { source, .. } => source.category(),
            Self::StepFailed { .. } => ErrorCategory::Scenario,
        }
    }
}

/// One executed step
#[derive(Debug)]
pub struct StepOutcome {
    pub name: &'static str,
    pub elapsed: Duration,
    /// The command's result for command steps, `None` for file steps
    pub result: Result<Option<CommandResult>, ScenarioError>,
}

impl StepOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Steps run by [`RuntimeSmokeTest::run_all`], in order
#[derive(Debug, Default)]
pub struct ScenarioReport {
    pub steps: Vec<StepOutcome>,
}

impl ScenarioReport {
    /// True when every step ran and succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.steps.len() == RuntimeSmokeTest::STEPS.len()
            && self.steps.iter().all(StepOutcome::succeeded)
    }

    /// The error that stopped the scenario.
    #[must_use]
    pub fn failure(&self) -> Option<&ScenarioError> {
        self.steps.iter().find_map(|step| step.result.as_ref().err())
    }
}

/// The runtime smoke test as explicit, sequential steps over a [`TestContext`].
pub struct RuntimeSmokeTest<'a> {
    ctx: TestContext<'a>,
    repository: String,
}

impl<'a> RuntimeSmokeTest<'a> {
    pub const STEPS: [&'static str; 4] = [
        STEP_PREPARE_SETTINGS,
        STEP_FETCH_RUNTIME,
        STEP_UNPACK_RUNTIME,
        STEP_RUN_CORE_IVT,
    ];

    /// Requires `[runtime].maven_repository`.
    pub fn new(ctx: TestContext<'a>) -> Result<Self, ScenarioError> {
        let repository = ctx
            .config
            .maven_repository()
            .ok_or(ScenarioError::MissingRepository)?
            .to_string();
        Ok(Self { ctx, repository })
    }

    fn version(&self) -> &str {
        self.ctx.config.runtime_version()
    }

    /// Write `.m2/settings.xml` pointing Maven at the configured repository.
    pub fn prepare_settings(&mut self) -> Result<(), ScenarioError> {
        let xml = render_settings(&self.repository)?;
        let settings = Utf8Path::new(SETTINGS_PATH);
        let files = self.ctx.files;

        if let Some(dir) = settings.parent() {
            files
                .create_dir_all(dir)
                .map_err(|source| ScenarioError::RemoteFile {
                    path: dir.to_string(),
                    source,
                })?;
        }
        files
            .write(settings, xml.as_bytes())
            .map_err(|source| ScenarioError::RemoteFile {
                path: SETTINGS_PATH.to_string(),
                source,
            })?;

        info!(path = %files.resolve(settings), "Maven settings written");
        Ok(())
    }

    #[must_use]
    pub fn fetch_runtime_spec(&self) -> CommandSpec {
        CommandSpec::new(
            format!(
                "mvn -B org.apache.maven.plugins:maven-dependency-plugin:2.8:get \
                 -Dartifact=dev.voras:runtime:{}:zip > mvn.log",
                self.version()
            ),
            "maven-rc",
        )
        .log("mvn.log")
    }

    #[must_use]
    pub fn unpack_runtime_spec(&self) -> CommandSpec {
        let version = self.version();
        CommandSpec::new(
            format!(
                "unzip -o .m2/repository/dev/voras/runtime/{version}/runtime-{version}.zip > unzip.log"
            ),
            "zip-rc",
        )
        .log("unzip.log")
    }

    #[must_use]
    pub fn run_core_ivt_spec(&self) -> CommandSpec {
        let version = self.version();
        let mut line = format!(
            "java -jar voras-boot.jar --remotemaven {} \
             --obr mvn:dev.voras/dev.voras.uber.obr/{version}/obr \
             --obr mvn:dev.voras/dev.voras.ivt.obr/{version}/obr \
             --test {}",
            shell_words::quote(&self.repository),
            shell_words::quote(self.ctx.config.test_class()),
        );
        if self.ctx.config.trace() {
            line.push_str(" --trace");
        }
        line.push_str(" > coreivt.log");
        CommandSpec::new(line, "voras-boot-rc").log("coreivt.log")
    }

    /// Download the runtime zip with Maven.
    pub fn fetch_runtime(&mut self) -> Result<CommandResult, ScenarioError> {
        let spec = self.fetch_runtime_spec();
        let result = self.run_command(STEP_FETCH_RUNTIME, &spec)?;
        info!("Runtime downloaded");
        Ok(result)
    }

    /// Unpack the runtime zip to get the boot jar.
    pub fn unpack_runtime(&mut self) -> Result<CommandResult, ScenarioError> {
        let spec = self.unpack_runtime_spec();
        let result = self.run_command(STEP_UNPACK_RUNTIME, &spec)?;
        info!("Runtime unpacked");
        Ok(result)
    }

    /// Run the core IVT through the boot jar.
    pub fn run_core_ivt(&mut self) -> Result<CommandResult, ScenarioError> {
        let spec = self.run_core_ivt_spec();
        self.run_command(STEP_RUN_CORE_IVT, &spec)
    }

    fn run_command(
        &mut self,
        step: &'static str,
        spec: &CommandSpec,
    ) -> Result<CommandResult, ScenarioError> {
        let result = self
            .ctx
            .run(spec)
            .map_err(|source| ScenarioError::Execution { step, source })?;
        if result.succeeded() {
            Ok(result)
        } else {
            Err(ScenarioError::StepFailed {
                step,
                exit_marker: result.exit_marker_value(),
            })
        }
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run_all(&mut self) -> ScenarioReport {
        let mut report = ScenarioReport::default();

        for step in Self::STEPS {
            let span = step_span(step);
            let _enter = span.enter();
            let started = Instant::now();

            let result = match step {
                STEP_PREPARE_SETTINGS => self.prepare_settings().map(|()| None),
                STEP_FETCH_RUNTIME => self.fetch_runtime().map(Some),
                STEP_UNPACK_RUNTIME => self.unpack_runtime().map(Some),
                _ => self.run_core_ivt().map(Some),
            };

            let elapsed = started.elapsed();
            log_step_complete(step, elapsed, result.is_ok());
            if let Err(err) = &result {
                error!(step, error = %err, "Scenario stopped");
            }

            let failed = result.is_err();
            report.steps.push(StepOutcome {
                name: step,
                elapsed,
                result,
            });
            if failed {
                break;
            }
        }

        report
    }
}

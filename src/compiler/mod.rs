//! Compiler service boundary.
//!
//! The build orchestrator only talks to a [`Compiler`]: it hands over a
//! [`BuildConfig`] and gets back a [`BuildResult`] with diagnostics. The
//! shipped backend is [`NativeCompiler`] (oxc + lightningcss).

pub mod native;
mod options;
mod result;

pub use native::NativeCompiler;
pub use options::{Banner, BuildConfig, Format, Minify, Platform, SourceMap};
pub use result::{BuildResult, Message};

use std::sync::Arc;

/// A backend that turns entry points into output files.
pub trait Compiler: Send + Sync {
    /// Run one build, writing outputs and reporting diagnostics.
    fn build(&self, config: &BuildConfig) -> BuildResult;
}

/// A compiler bound to one configuration, rebuildable on demand.
///
/// This is what a watch session drives.
#[derive(Clone)]
pub struct BuildContext {
    compiler: Arc<dyn Compiler>,
    config: Arc<BuildConfig>,
}

impl BuildContext {
    pub fn new(compiler: Arc<dyn Compiler>, config: BuildConfig) -> Self {
        Self {
            compiler,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn rebuild(&self) -> BuildResult {
        self.compiler.build(&self.config)
    }
}

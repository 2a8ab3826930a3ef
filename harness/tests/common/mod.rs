//! Shared support for the integration tests: a compiler provider stand-in
//! that needs no JDK, copying each source unit to a same-named `.class`
//! file in `ClassOutput` and reporting one diagnostic per unit whose name
//! contains `"Broken"`.

use std::{io::Write, sync::Arc};

use harness::{
    CompilationTask, CompilerProvider, DiagnosticKind, DiagnosticListener, DiagnosticSource, FileManagerSeed,
    JavaFileManager, Locale, ModuleRef, PathFileObject, Position, ReportedDiagnostic,
};

#[derive(Default)]
pub struct FakeCompilerProvider {
    pub extra_class_path: Vec<std::path::PathBuf>,
}

struct FakeCompilationTask {
    file_manager: Arc<dyn JavaFileManager>,
    listener: Arc<dyn DiagnosticListener>,
    units: Vec<Arc<PathFileObject>>,
}

impl FakeCompilationTask {
    /// If `unit` was gathered from some module under `ModuleSourcePath`,
    /// returns that module so its output can be written into the matching
    /// partition of `ClassOutput` rather than flatly.
    fn owning_module(&self, unit: &PathFileObject) -> Option<ModuleRef> {
        let modules = self.file_manager.list_location_for_modules(&harness::Location::ModuleSourcePath).ok()?;
        modules.into_iter().find(|module| {
            self.file_manager
                .list_in_module(module, "", &[], true)
                .map(|files| files.iter().any(|f| self.file_manager.is_same_file(f, unit)))
                .unwrap_or(false)
        })
    }
}

impl CompilationTask for FakeCompilationTask {
    fn call(self: Box<Self>) -> bool {
        let mut ok = true;
        for unit in &self.units {
            let binary_name = unit.binary_name().unwrap_or("unknown").to_string();
            if binary_name.contains("Broken") {
                self.listener.report(
                    ReportedDiagnostic::new(DiagnosticKind::Error, format!("cannot compile {binary_name}"))
                        .with_position(Position::new(0, 1, 1, 1))
                        .with_source(DiagnosticSource::new(unit.uri(), binary_name.clone())),
                );
                ok = false;
                continue;
            }
            let module = self.owning_module(unit);
            let write_result = match module {
                Some(module) => self
                    .file_manager
                    .get_java_file_for_output_in_module(&module, &binary_name, harness::FileKind::Class)
                    .and_then(|out| out.write_bytes(b"\xCA\xFE\xBA\xBE")),
                None => self
                    .file_manager
                    .get_java_file_for_output(&harness::Location::ClassOutput, &binary_name, harness::FileKind::Class)
                    .and_then(|out| out.write_bytes(b"\xCA\xFE\xBA\xBE")),
            };
            if write_result.is_err() {
                ok = false;
            }
        }
        ok
    }
}

impl CompilerProvider for FakeCompilerProvider {
    type Error = std::convert::Infallible;

    fn create_file_manager_seed(
        &self,
        _listener: Arc<dyn DiagnosticListener>,
        _locale: Option<Locale>,
        _charset: &'static encoding_rs::Encoding,
    ) -> Result<FileManagerSeed, Self::Error> {
        Ok(FileManagerSeed { extra_class_path: self.extra_class_path.clone(), inherit_host_class_path: false })
    }

    fn get_task(
        &self,
        out_sink: &mut dyn Write,
        file_manager: Arc<dyn JavaFileManager>,
        listener: Arc<dyn DiagnosticListener>,
        _options: &[String],
        _class_names: &[String],
        units: Vec<Arc<PathFileObject>>,
    ) -> Result<Box<dyn CompilationTask>, Self::Error> {
        writeln!(out_sink, "fake-javac: {} unit(s)", units.len()).ok();
        Ok(Box::new(FakeCompilationTask { file_manager, listener, units }))
    }

    fn supported_release_strings(&self) -> &[&str] {
        &["8", "11", "17", "21"]
    }
}

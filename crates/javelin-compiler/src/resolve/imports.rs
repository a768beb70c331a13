//! Import declarations and simple type name lookup.

use javelin_core::{CompilationError, Span};
use javelin_parser::ast::{ImportDecl, dotted};
use rustc_hash::FxHashMap;

use crate::context::{ClassTable, MethodMatch, simple_name};

/// An import given as a dotted string, e.g. `java.util.*` or
/// `static java.lang.Math.max`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    pub path: String,
    pub is_static: bool,
    pub on_demand: bool,
}

impl ImportSpec {
    /// Parse the text after `import`, without the trailing semicolon.
    pub fn parse(text: &str) -> ImportSpec {
        let text = text.trim();
        let (is_static, rest) = match text.strip_prefix("static ") {
            Some(rest) => (true, rest.trim()),
            None => (false, text),
        };
        let (on_demand, path) = match rest.strip_suffix(".*") {
            Some(path) => (true, path),
            None => (false, rest),
        };
        ImportSpec {
            path: path.to_string(),
            is_static,
            on_demand,
        }
    }

    fn from_decl(decl: &ImportDecl<'_>) -> ImportSpec {
        ImportSpec {
            path: dotted(decl.path),
            is_static: decl.is_static,
            on_demand: decl.on_demand,
        }
    }
}

/// The names a compilation unit can refer to without qualification.
#[derive(Debug, Default)]
pub struct ImportScope {
    package: String,
    /// Simple name to binary name, from single-type imports.
    single: FxHashMap<String, String>,
    /// Packages imported on demand, `java.lang` first.
    on_demand: Vec<String>,
    /// `(class, member)` pairs of single static imports.
    static_single: Vec<(String, String)>,
    /// Classes whose static members are imported on demand.
    static_on_demand: Vec<String>,
}

impl ImportScope {
    /// Build the scope of a unit in `package` from its own imports and the
    /// embedder's default imports. Default imports are checked like the
    /// unit's own.
    pub fn new(
        table: &ClassTable<'_>,
        package: &str,
        defaults: &[ImportSpec],
        decls: &[ImportDecl<'_>],
    ) -> Result<Self, CompilationError> {
        let mut scope = ImportScope {
            package: package.to_string(),
            on_demand: vec!["java.lang".to_string()],
            ..Default::default()
        };
        for spec in defaults {
            scope.add(table, spec, Span::default())?;
        }
        for decl in decls {
            scope.add(table, &ImportSpec::from_decl(decl), decl.span)?;
        }
        log::trace!(
            "import scope of package '{package}': {} single, {} on demand",
            scope.single.len(),
            scope.on_demand.len()
        );
        Ok(scope)
    }

    fn add(&mut self, table: &ClassTable<'_>, spec: &ImportSpec, span: Span) -> Result<(), CompilationError> {
        let path = spec.path.as_str();
        match (spec.is_static, spec.on_demand) {
            (false, false) => {
                if !table.exists(path) {
                    return Err(CompilationError::TypeNotFound {
                        name: path.to_string(),
                        span,
                    });
                }
                let simple = simple_name(path).to_string();
                if let Some(previous) = self.single.get(&simple)
                    && previous != path
                {
                    return Err(CompilationError::DuplicateDefinition { name: simple, span });
                }
                let local = qualify(&self.package, &simple);
                if table.is_unit_class(&local) && local != path {
                    return Err(CompilationError::DuplicateDefinition { name: simple, span });
                }
                self.single.insert(simple, path.to_string());
            }
            (false, true) => {
                if !table.package_exists(path) && !table.exists(path) {
                    return Err(CompilationError::NameNotFound {
                        name: path.to_string(),
                        span,
                    });
                }
                if !self.on_demand.iter().any(|p| p == path) {
                    self.on_demand.push(path.to_string());
                }
            }
            (true, false) => {
                let (class, member) = path.rsplit_once('.').ok_or_else(|| CompilationError::NameNotFound {
                    name: path.to_string(),
                    span,
                })?;
                if !table.exists(class) {
                    return Err(CompilationError::TypeNotFound {
                        name: class.to_string(),
                        span,
                    });
                }
                let has_member = table.find_field(class, member).is_some_and(|f| f.field.access.is_static())
                    || table
                        .find_methods(class, member)
                        .iter()
                        .any(|m| m.method.access.is_static());
                if !has_member {
                    return Err(CompilationError::NameNotFound {
                        name: path.to_string(),
                        span,
                    });
                }
                self.static_single.push((class.to_string(), member.to_string()));
            }
            (true, true) => {
                if !table.exists(path) {
                    return Err(CompilationError::TypeNotFound {
                        name: path.to_string(),
                        span,
                    });
                }
                self.static_on_demand.push(path.to_string());
            }
        }
        Ok(())
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Resolve a simple type name. Order: classes of the unit's package
    /// (the unit's own first), single-type imports, on-demand imports.
    pub fn resolve_simple(
        &self,
        table: &ClassTable<'_>,
        name: &str,
        span: Span,
    ) -> Result<Option<String>, CompilationError> {
        let local = qualify(&self.package, name);
        if table.is_unit_class(&local) {
            return Ok(Some(local));
        }
        if let Some(imported) = self.single.get(name) {
            return Ok(Some(imported.clone()));
        }
        if table.exists(&local) {
            return Ok(Some(local));
        }
        let mut found: Vec<String> = Vec::new();
        for package in &self.on_demand {
            let candidate = qualify(package, name);
            if table.exists(&candidate) && !found.contains(&candidate) {
                found.push(candidate);
            }
        }
        match found.len() {
            0 => Ok(None),
            1 => Ok(found.pop()),
            _ => Err(CompilationError::AmbiguousName {
                name: name.to_string(),
                candidates: found.join(", "),
                span,
            }),
        }
    }

    /// Classes whose statically imported field `name` is in scope.
    pub fn static_field_owners(&self, table: &ClassTable<'_>, name: &str) -> Vec<String> {
        let has_field = |class: &str| {
            table
                .find_field(class, name)
                .is_some_and(|f| f.field.access.is_static())
        };
        let single: Vec<String> = self
            .static_single
            .iter()
            .filter(|(class, member)| member == name && has_field(class))
            .map(|(class, _)| class.clone())
            .collect();
        if !single.is_empty() {
            return single;
        }
        self.static_on_demand
            .iter()
            .filter(|class| has_field(class))
            .cloned()
            .collect()
    }

    /// Statically imported methods called `name`.
    pub fn static_methods(&self, table: &ClassTable<'_>, name: &str) -> Vec<MethodMatch> {
        let single = static_methods_of(
            table,
            name,
            self.static_single
                .iter()
                .filter(|(_, member)| member == name)
                .map(|(class, _)| class),
        );
        if !single.is_empty() {
            return single;
        }
        static_methods_of(table, name, self.static_on_demand.iter())
    }
}

fn static_methods_of<'a>(
    table: &ClassTable<'_>,
    name: &str,
    classes: impl Iterator<Item = &'a String>,
) -> Vec<MethodMatch> {
    let mut out: Vec<MethodMatch> = Vec::new();
    for class in classes {
        for found in table.find_methods(class, name) {
            if found.method.access.is_static() && !out.contains(&found) {
                out.push(found);
            }
        }
    }
    out
}

/// `package.name`, or `name` in the unnamed package.
pub fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

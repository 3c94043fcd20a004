use crate::{Arguments, MismatchReason};

/// One declared parameter of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub required: bool,
}

/// Named parameters a handler accepts.
///
/// Checked against the [`Arguments`] of every invocation before the handler
/// body runs. The default signature is variadic and accepts any arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
    accepts_extra: bool,
}

impl Signature {
    /// Accepts any set of named arguments.
    pub fn variadic() -> Self {
        Self {
            params: Vec::new(),
            accepts_extra: true,
        }
    }

    /// Accepts no arguments at all. Add parameters with [`Self::required`]
    /// and [`Self::optional`].
    pub fn empty() -> Self {
        Self {
            params: Vec::new(),
            accepts_extra: false,
        }
    }

    pub fn required(
        self,
        name: impl Into<String>,
    ) -> Self {
        self.param(name.into(), true)
    }

    pub fn optional(
        self,
        name: impl Into<String>,
    ) -> Self {
        self.param(name.into(), false)
    }

    /// Also accept arguments not declared as parameters.
    pub fn with_extra(mut self) -> Self {
        self.accepts_extra = true;
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn accepts_extra(&self) -> bool {
        self.accepts_extra
    }

    /// Checks that `args` can be bound to this signature.
    ///
    /// Unexpected names are reported before missing ones; within each class
    /// the first offending name wins.
    pub fn bind(
        &self,
        args: &Arguments,
    ) -> Result<(), MismatchReason> {
        if !self.accepts_extra {
            if let Some(name) = args.names().find(|name| !self.declares(name)) {
                return Err(MismatchReason::Unexpected(name.to_owned()));
            }
        }

        match self
            .params
            .iter()
            .find(|p| p.required && !args.contains(&p.name))
        {
            Some(missing) => Err(MismatchReason::Missing(missing.name.clone())),
            None => Ok(()),
        }
    }

    fn declares(
        &self,
        name: &str,
    ) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    fn param(
        mut self,
        name: String,
        required: bool,
    ) -> Self {
        match self.params.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.required = required,
            None => self.params.push(Param { name, required }),
        }
        self
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::variadic()
    }
}

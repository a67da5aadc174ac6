use std::io::Write;

use crate::error::LabspecError;
use crate::request::Request;
use crate::rspec_xml;
use crate::tour_xml::Tour;

/// Provisioning context: owns at most one request and prints it at most once.
///
/// The lifecycle is linear — bind a request, populate it, print it, done.
/// Rebinding or reprinting is an error rather than a silent overwrite.
#[derive(Debug, Default)]
pub struct Context {
    request: Option<Request>,
    tour: Option<Tour>,
    printed: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the request container and hand it out for population.
    pub fn make_request(&mut self) -> Result<&mut Request, LabspecError> {
        if self.request.is_some() {
            return Err(LabspecError::RequestAlreadyBound);
        }
        self.request = Some(Request::new());
        Ok(self.request.as_mut().expect("request was just bound"))
    }

    /// Bind an externally built request.
    pub fn bind_request(&mut self, request: Request) -> Result<(), LabspecError> {
        if self.request.is_some() {
            return Err(LabspecError::RequestAlreadyBound);
        }
        self.request = Some(request);
        Ok(())
    }

    /// Attach tour text to be embedded in the emitted document.
    pub fn set_tour(&mut self, tour: Tour) {
        self.tour = Some(tour);
    }

    /// Validate, serialize, and write the bound request. Exactly once per
    /// context — serialization or write failures propagate unmodified.
    pub fn print_request_rspec(&mut self, out: &mut dyn Write) -> Result<(), LabspecError> {
        if self.printed {
            return Err(LabspecError::AlreadyPrinted);
        }
        let request = self.request.as_ref().ok_or(LabspecError::RequestNotBound)?;
        request.validate()?;

        let document = rspec_xml::generate_rspec_xml(request, self.tour.as_ref())?;
        out.write_all(document.as_bytes())
            .map_err(|e| LabspecError::Io {
                context: "writing request specification".into(),
                source: e,
            })?;

        self.printed = true;
        Ok(())
    }
}

use super::{Interceptor, InterceptorKind, ParameterMerge, RequestParameterInfo, ResponseInfo, TargetResource};
use crate::diagnostics::Diagnostic;
use crate::service::ResourceFunction;
use crate::types::{BalType, TypeLattice};
use log::debug;

/// Ordered interceptors of one service.
pub struct InterceptorPipeline<'a> {
    interceptors: &'a [Interceptor],
}

/// What the interceptor chain and the target resource expose together.
#[derive(Debug, Clone, Default)]
pub struct PipelineAnalysis {
    pub parameters: RequestParameterInfo,
    pub response: ResponseInfo,
    pub diagnostics: Vec<Diagnostic>,
    /// Names of the interceptors that apply, in execution order.
    pub applied: Vec<String>,
}

impl PipelineAnalysis {
    /// The target's return types followed by the interceptors', as one type.
    pub fn effective_return_type(&self, lattice: &dyn TypeLattice) -> Option<BalType> {
        let members: Vec<BalType> = self
            .response
            .return_types_from_target_resource()
            .iter()
            .chain(self.response.return_types_from_interceptors())
            .cloned()
            .collect();
        lattice.union_of(&members)
    }
}

impl<'a> InterceptorPipeline<'a> {
    pub fn new(interceptors: &'a [Interceptor]) -> Self {
        Self { interceptors }
    }

    /// Walk the chain for `target`: request-side interceptors in declaration order, the
    /// target itself, then response-side interceptors in reverse order.
    pub fn analyze(&self, target: &ResourceFunction, lattice: &dyn TypeLattice) -> PipelineAnalysis {
        let target = TargetResource::new(target);
        let location = target.label();
        let mut analysis = PipelineAnalysis::default();

        for interceptor in self.interceptors.iter().filter(|i| i.kind.is_request_side()) {
            if !interceptor.is_invokable(target.resource(), lattice) {
                debug!("Interceptor {} does not apply to {}", interceptor.name, location);
                continue;
            }
            analysis.applied.push(interceptor.name.clone());

            if interceptor.kind == InterceptorKind::Request {
                if let Some(resource) = &interceptor.resource {
                    for param in resource.data_params(lattice) {
                        let outcome =
                            analysis
                                .parameters
                                .update(&param, &interceptor.name, false, lattice);
                        Self::record(&mut analysis, outcome, &location);
                    }
                }
                if interceptor.has_data_binding(lattice) {
                    analysis.response.mark_data_binding_error();
                }
            }

            for ty in interceptor.response_types(lattice) {
                analysis.response.add_interceptor_return_type(ty);
            }
            if interceptor.kind.handles_errors() {
                analysis.response.mark_data_binding_error_handled();
            }
        }

        let origin = location.clone();
        for param in target.resource().data_params(lattice) {
            let outcome = analysis.parameters.update(&param, &origin, true, lattice);
            Self::record(&mut analysis, outcome, &location);
        }
        if target.has_data_binding(lattice) {
            analysis.response.mark_data_binding_error();
        }
        analysis
            .response
            .add_target_return_type(target.effective_return_type());

        for interceptor in self.interceptors.iter().rev().filter(|i| !i.kind.is_request_side()) {
            analysis.applied.push(interceptor.name.clone());
            for ty in interceptor.response_types(lattice) {
                analysis.response.add_interceptor_return_type(ty);
            }
            if interceptor.kind.handles_errors() {
                analysis.response.mark_data_binding_error_handled();
            }
        }

        debug!(
            "Resource {}: {} interceptor(s) applied, {} parameter(s), {} diagnostic(s)",
            location,
            analysis.applied.len(),
            analysis.parameters.len(),
            analysis.diagnostics.len()
        );
        analysis
    }

    fn record(analysis: &mut PipelineAnalysis, outcome: ParameterMerge, location: &str) {
        match outcome {
            ParameterMerge::Merged(_) => {}
            ParameterMerge::Defaulted(_, diagnostic) | ParameterMerge::Rejected(diagnostic) => {
                analysis.diagnostics.push(diagnostic.at(location));
            }
        }
    }
}

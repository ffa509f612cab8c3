use crate::recorder::Recorder;

/// A titled step of a feature run.
pub struct Phase<C> {
    pub title: &'static str,
    pub run: fn(&C, &mut Recorder<'_>),
}

/// Run every phase in order; a phase never prevents the next from running.
pub fn run_phases<C>(context: &C, phases: &[Phase<C>], recorder: &mut Recorder<'_>) {
    for phase in phases {
        recorder.begin_phase(phase.title);
        (phase.run)(context, recorder);
    }
}

use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Edit the input string
    #[key("i")]
    EditInput,
    /// Prepare the simulation for the current input and pattern
    #[key("enter")]
    Prepare,
    /// Advance the machine by one step
    #[key("space")]
    Step,
    /// Toggle automatic stepping
    #[key("p")]
    ToggleAutoPlay,
    /// Discard the current run
    #[key("r")]
    Reset,
    /// Export a report of the current run
    #[key("e")]
    Export,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Select the previous pattern
    #[key("up")]
    PreviousPattern,
    /// Select the next pattern
    #[key("down")]
    NextPattern,
}

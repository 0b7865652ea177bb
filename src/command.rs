#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Command {
  CancelCompose,
  CloseThread,
  ComposeComment,
  ComposeCommunity,
  ComposePost,
  ComposeReply,
  Dislike,
  HideHelp,
  Like,
  None,
  OpenImage,
  OpenSelected,
  PageDown,
  PageUp,
  Quit,
  Refresh,
  SelectFirst,
  SelectNext,
  SelectPrevious,
  ShowHelp,
  SignOut,
  SubmitCompose,
  SwitchTabLeft,
  SwitchTabRight,
}

//! Client-side activation for anchor links and footnote scroll targets.

/// Distance in pixels kept between the viewport top and a scroll target.
pub const SCROLL_OFFSET_PX: u32 = 80;

/// Prefix of footnote ids and fragments in converter output.
pub const FOOTNOTE_ID_PREFIX: &str = "user-content-";

/// Delegated click listener for elements carrying `data-scroll-target`.
///
/// Smooth-scrolls the matching element to [`SCROLL_OFFSET_PX`] below the
/// viewport top, then updates the URL fragment without a navigation. Pages
/// include it once.
pub const SCROLL_SCRIPT: &str = r##"(function () {
  var OFFSET = 80;
  document.addEventListener("click", function (event) {
    var trigger = event.target.closest("[data-scroll-target]");
    if (!trigger) return;
    var id = trigger.getAttribute("data-scroll-target");
    var target = document.getElementById(id);
    if (!target) return;
    event.preventDefault();
    var top = target.getBoundingClientRect().top + window.scrollY - OFFSET;
    window.scrollTo({ top: top, behavior: "smooth" });
    history.replaceState(null, "", "#" + id);
  });
})();"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_uses_offset_and_attribute() {
        assert!(SCROLL_SCRIPT.contains(&format!("OFFSET = {}", SCROLL_OFFSET_PX)));
        assert!(SCROLL_SCRIPT.contains("data-scroll-target"));
        assert!(SCROLL_SCRIPT.contains("history.replaceState"));
        assert!(SCROLL_SCRIPT.trim_end().ends_with("})();"));
    }
}

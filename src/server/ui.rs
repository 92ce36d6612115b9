/// Single-page UI: a title box that posts to `/research` and shows the result.
pub(super) const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AI Research Agent</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 3rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.8rem; }
  form { display: flex; gap: .5rem; }
  input { flex: 1; padding: .5rem; font-size: 1rem; }
  button { padding: .5rem 1rem; font-size: 1rem; }
  #status { color: #666; margin-top: 1rem; }
  #error { color: #b00020; margin-top: 1rem; }
  #summary { white-space: pre-wrap; line-height: 1.5; }
</style>
</head>
<body>
<h1>AI Research Agent</h1>
<form id="query">
  <input id="title" name="paper_title" autocomplete="off"
         placeholder="Enter the title of the research paper you're looking for" required>
  <button type="submit">Research</button>
</form>
<p id="status" hidden>Searching, downloading and summarizing. This can take a minute.</p>
<p id="error" hidden></p>
<section id="result" hidden>
  <h2>Summary</h2>
  <p id="summary"></p>
  <p>Source: <a id="source" target="_blank" rel="noopener"></a></p>
</section>
<script>
const form = document.getElementById("query");
const show = (id, on) => { document.getElementById(id).hidden = !on; };
form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const title = document.getElementById("title").value.trim();
  if (!title) return;
  show("result", false); show("error", false); show("status", true);
  form.querySelector("button").disabled = true;
  try {
    const res = await fetch("/research", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ paper_title: title }),
    });
    const body = await res.json();
    if (!res.ok || !body.summary) throw new Error(body.error || res.statusText);
    document.getElementById("summary").textContent = body.summary;
    const link = document.getElementById("source");
    link.href = body.pdf_url;
    link.textContent = body.pdf_url;
    show("result", true);
  } catch (err) {
    const el = document.getElementById("error");
    el.textContent = "Could not find or process the requested research paper. (" + err.message + ")";
    show("error", true);
  } finally {
    show("status", false);
    form.querySelector("button").disabled = false;
  }
});
</script>
</body>
</html>
"#;
